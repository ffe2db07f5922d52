//! An observable value cell.

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A shared, observable value.
///
/// Holds a current value and notifies subscribers whenever it changes.
/// Clones share the same value and subscribers.
///
/// Writes and the notifications they cause are serialized, so every
/// subscriber sees changes in the order they were made. A subscriber may
/// read the store, or even write to it, from inside its callback. A write
/// made during notification supersedes the value being delivered: the
/// remaining subscribers skip the stale value and everyone is brought up to
/// the newest one, so each subscriber's last notification matches
/// [`get`](Self::get).
pub struct Writable<T> {
  inner: Arc<Inner<T>>,
}

struct Inner<T> {
  value: RwLock<T>,
  subscribers: Mutex<Subscribers<T>>,
  // Serializes write + notify. Re-entrant so callbacks can write.
  serial: ReentrantMutex<Serial>,
}

// Only touched while `serial` is held.
#[derive(Default)]
struct Serial {
  version: Cell<u64>,
  notifying: Cell<bool>,
}

// Clears `notifying` even if a callback panics.
struct NotifyingGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyingGuard<'_> {
  fn drop(&mut self) {
    self.0.set(false);
  }
}

struct Subscribers<T> {
  next_id: u64,
  entries: Vec<(u64, Callback<T>)>,
}

impl<T> Clone for Writable<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T: Default + Clone + PartialEq + Send + Sync + 'static> Default for Writable<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Writable<T> {
  /// A store holding `initial`, with no subscribers.
  pub fn new(initial: T) -> Self {
    Self {
      inner: Arc::new(Inner {
        value: RwLock::new(initial),
        subscribers: Mutex::new(Subscribers {
          next_id: 0,
          entries: Vec::new(),
        }),
        serial: ReentrantMutex::new(Serial::default()),
      }),
    }
  }

  /// The current value.
  pub fn get(&self) -> T {
    self.inner.value.read().clone()
  }

  /// Replaces the value. Subscribers are notified only if it changed.
  /// Returns whether it changed.
  pub fn set(&self, value: T) -> bool {
    let serial = self.inner.serial.lock();
    {
      let mut current = self.inner.value.write();
      if *current == value {
        return false;
      }
      *current = value;
    }
    serial.version.set(serial.version.get().wrapping_add(1));

    // A write from inside a callback is delivered by the outermost `set`.
    if serial.notifying.replace(true) {
      return true;
    }
    let _notifying = NotifyingGuard(&serial.notifying);
    self.notify(&serial);
    true
  }

  /// Sets the value to `f(current)`.
  pub fn update<F>(&self, f: F) -> bool
  where
    F: FnOnce(&T) -> T,
  {
    let _serial = self.inner.serial.lock();
    let next = f(&self.inner.value.read());
    self.set(next)
  }

  /// Registers `callback`, calls it right away with the current value, then
  /// again after every change until the returned [`Subscription`] is dropped.
  #[must_use = "dropping the Subscription unsubscribes immediately"]
  pub fn subscribe<F>(&self, callback: F) -> Subscription
  where
    F: Fn(&T) + Send + Sync + 'static,
  {
    let callback: Callback<T> = Arc::new(callback);
    let _serial = self.inner.serial.lock();

    let id = {
      let mut subscribers = self.inner.subscribers.lock();
      let id = subscribers.next_id;
      subscribers.next_id += 1;
      subscribers.entries.push((id, Arc::clone(&callback)));
      id
    };
    callback(&self.get());

    let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
    Subscription {
      unsubscribe: Some(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
          inner.subscribers.lock().entries.retain(|(entry, _)| *entry != id);
        }
      })),
    }
  }

  /// Number of live subscriptions.
  pub fn subscriber_count(&self) -> usize {
    self.inner.subscribers.lock().entries.len()
  }

  // Delivers the current value, restarting whenever a callback writes.
  fn notify(&self, serial: &Serial) {
    let mut delivered: HashMap<u64, T> = HashMap::new();
    'deliver: loop {
      let version = serial.version.get();
      let value = self.get();
      // Snapshot first so callbacks run without the subscriber lock held.
      let callbacks: Vec<(u64, Callback<T>)> = self
        .inner
        .subscribers
        .lock()
        .entries
        .iter()
        .map(|(id, callback)| (*id, Arc::clone(callback)))
        .collect();
      tracing::trace!(subscribers = callbacks.len(), version, "store changed");

      for (id, callback) in callbacks {
        if serial.version.get() != version {
          continue 'deliver;
        }
        if delivered.get(&id) == Some(&value) {
          continue;
        }
        callback(&value);
        delivered.insert(id, value.clone());
      }
      if serial.version.get() == version {
        return;
      }
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Writable")
      .field("value", &*self.inner.value.read())
      .field("subscribers", &self.inner.subscribers.lock().entries.len())
      .finish()
  }
}

/// Keeps a store subscription alive. Dropping it unsubscribes.
#[must_use = "dropping the Subscription unsubscribes immediately"]
pub struct Subscription {
  unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
  /// Stops notifications now.
  pub fn unsubscribe(mut self) {
    if let Some(unsubscribe) = self.unsubscribe.take() {
      unsubscribe();
    }
  }

  /// Keeps the subscription for as long as the store lives.
  pub fn detach(mut self) {
    self.unsubscribe = None;
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(unsubscribe) = self.unsubscribe.take() {
      unsubscribe();
    }
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.unsubscribe.is_some())
      .finish()
  }
}
