//! External cancellation for in-flight waits.

use parking_lot::{Condvar, Mutex};

use core::pin::Pin;
use core::task::{Context, Poll, Waker};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A cloneable signal that settles every wait listening to it as
/// [`WaitOutcome::Canceled`](crate::WaitOutcome::Canceled).
///
/// Cancelling is idempotent and one-way. A token can be shared by any number
/// of async and blocking waits at once.
#[derive(Clone, Default)]
pub struct CancelToken {
  shared: Arc<CancelShared>,
}

#[derive(Default)]
struct CancelShared {
  canceled: AtomicBool,
  // Guards waker registration and is the mutex blocking waiters park on.
  listeners: Mutex<Listeners>,
  cond: Condvar,
}

#[derive(Default)]
struct Listeners {
  next_key: u64,
  wakers: HashMap<u64, Waker>,
}

impl CancelToken {
  /// A token that has not fired.
  pub fn new() -> Self {
    Self::default()
  }

  /// Fires the token, waking every listener. Later calls do nothing.
  pub fn cancel(&self) {
    if self.shared.canceled.swap(true, Ordering::AcqRel) {
      return;
    }
    let wakers: Vec<Waker> = {
      let mut listeners = self.shared.listeners.lock();
      self.shared.cond.notify_all();
      listeners.wakers.drain().map(|(_, waker)| waker).collect()
    };
    tracing::debug!(woken = wakers.len(), "cancel token fired");
    for waker in wakers {
      waker.wake();
    }
  }

  /// Whether the token has fired.
  #[inline]
  pub fn is_canceled(&self) -> bool {
    self.shared.canceled.load(Ordering::Acquire)
  }

  /// A future that resolves once the token has fired.
  pub fn canceled(&self) -> Canceled<'_> {
    Canceled {
      shared: &self.shared,
      key: None,
    }
  }

  /// Blocks the calling thread until `deadline` or until the token fires,
  /// whichever comes first. Returns `true` if the token fired.
  pub(crate) fn park_until(&self, deadline: Instant) -> bool {
    let mut listeners = self.shared.listeners.lock();
    loop {
      if self.is_canceled() {
        return true;
      }
      if self.shared.cond.wait_until(&mut listeners, deadline).timed_out() {
        return self.is_canceled();
      }
    }
  }

  #[cfg(test)]
  fn listener_count(&self) -> usize {
    self.shared.listeners.lock().wakers.len()
  }
}

impl fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CancelToken")
      .field("canceled", &self.is_canceled())
      .finish_non_exhaustive()
  }
}

/// Future returned by [`CancelToken::canceled`].
#[must_use = "futures do nothing unless polled"]
pub struct Canceled<'a> {
  shared: &'a CancelShared,
  key: Option<u64>,
}

impl Future for Canceled<'_> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.get_mut();
    if this.shared.canceled.load(Ordering::Acquire) {
      return Poll::Ready(());
    }

    let mut listeners = this.shared.listeners.lock();
    // Re-check under the lock: `cancel` sets the flag before draining.
    if this.shared.canceled.load(Ordering::Acquire) {
      return Poll::Ready(());
    }
    let key = match this.key {
      Some(key) => key,
      None => {
        let key = listeners.next_key;
        listeners.next_key += 1;
        this.key = Some(key);
        key
      }
    };
    match listeners.wakers.get_mut(&key) {
      Some(existing) if existing.will_wake(cx.waker()) => {}
      Some(existing) => *existing = cx.waker().clone(),
      None => {
        listeners.wakers.insert(key, cx.waker().clone());
      }
    }
    Poll::Pending
  }
}

impl Drop for Canceled<'_> {
  fn drop(&mut self) {
    if let Some(key) = self.key.take() {
      self.shared.listeners.lock().wakers.remove(&key);
    }
  }
}

impl fmt::Debug for Canceled<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Canceled")
      .field("registered", &self.key.is_some())
      .finish()
  }
}
