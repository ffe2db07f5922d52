//! The `Context` registry.

use crate::registry::{AnyService, Provider, ResolutionGuard, ServiceKey};
use crate::error::{ContextError, Result};

use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(0);

/// An explicit, thread-safe registry of shared services.
///
/// Consumers receive a `&Context` (or an `Arc<Context>`) instead of reaching
/// for process-wide globals. Services are keyed by type and an optional
/// name, handed out as `Arc<T>`, and live as long as the context does.
pub struct Context {
  id: u64,
  providers: DashMap<ServiceKey, Arc<Provider>>,
}

impl Default for Context {
  fn default() -> Self {
    Self {
      id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
      providers: DashMap::new(),
    }
  }
}

impl Context {
  /// An empty context.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn register(&self, key: ServiceKey, provider: Provider, type_name: &'static str) {
    if self.providers.insert(key.clone(), Arc::new(provider)).is_some() {
      tracing::debug!(service = type_name, name = ?key.name(), "service replaced");
    } else {
      tracing::debug!(service = type_name, name = ?key.name(), "service registered");
    }
  }

  fn resolve_key<T: ?Sized + Any + Send + Sync>(&self, key: ServiceKey) -> Result<Arc<T>> {
    let type_name = type_name::<T>();
    let _guard = ResolutionGuard::enter(self.id, &key, type_name)?;

    // Clone the provider out so no map lock is held while a factory runs;
    // factories are free to resolve or register other services.
    let provider = self
      .providers
      .get(&key)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| ContextError::Missing {
        type_name,
        name: key.name().map(str::to_owned),
      })?;

    let service = provider.resolve(self)?;
    let shared = service.downcast_ref::<Arc<T>>().cloned();
    shared.ok_or(ContextError::Missing {
        type_name,
        name: key.name().map(str::to_owned),
      })
  }

  // --- Registration ---

  /// Registers a ready value, replacing any previous registration of `T`.
  pub fn provide<T: Any + Send + Sync>(&self, value: T) {
    self.provide_shared(Arc::new(value));
  }

  /// Registers a ready value under `name`. Named and unnamed registrations
  /// of the same type are independent.
  pub fn provide_named<T: Any + Send + Sync>(&self, name: &str, value: T) {
    self.provide_shared_named(name, Arc::new(value));
  }

  /// Registers an already shared service. `T` may be a trait object:
  /// `ctx.provide_shared::<dyn Clock>(Arc::new(SystemClock))`.
  pub fn provide_shared<T: ?Sized + Any + Send + Sync>(&self, service: Arc<T>) {
    let boxed: AnyService = Box::new(service);
    self.register(ServiceKey::of::<T>(None), Provider::instance(boxed), type_name::<T>());
  }

  /// [`provide_shared`](Self::provide_shared) under `name`.
  pub fn provide_shared_named<T: ?Sized + Any + Send + Sync>(&self, name: &str, service: Arc<T>) {
    let boxed: AnyService = Box::new(service);
    self.register(ServiceKey::of::<T>(Some(name)), Provider::instance(boxed), type_name::<T>());
  }

  /// Registers a singleton built on first resolution. The factory receives
  /// this context and may resolve other services from it.
  pub fn provide_lazy<T, F>(&self, factory: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Context) -> T + Send + Sync + 'static,
  {
    self.provide_lazy_try(move |ctx| Ok(factory(ctx)));
  }

  /// Like [`provide_lazy`](Self::provide_lazy), for factories whose own
  /// dependencies may be missing. A failed build is retried on the next
  /// resolution.
  pub fn provide_lazy_try<T, F>(&self, factory: F)
  where
    T: Any + Send + Sync,
    F: Fn(&Context) -> Result<T> + Send + Sync + 'static,
  {
    let erased = Box::new(move |ctx: &Context| -> Result<AnyService> {
      let service = factory(ctx)?;
      Ok(Box::new(Arc::new(service)))
    });
    self.register(ServiceKey::of::<T>(None), Provider::lazy(erased), type_name::<T>());
  }

  // --- Resolution ---

  /// Resolves `T`, or `None` if it is not registered or cannot be built.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.require::<T>().ok()
  }

  /// Resolves the `T` registered under `name`.
  pub fn get_named<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
    self.require_named::<T>(name).ok()
  }

  /// Resolves `T`, reporting why it could not be.
  pub fn require<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.resolve_key(ServiceKey::of::<T>(None))
  }

  /// Resolves the `T` registered under `name`, reporting why it could not be.
  pub fn require_named<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.resolve_key(ServiceKey::of::<T>(Some(name)))
  }

  /// Resolves `T`, registering `init()` first if nothing is registered.
  ///
  /// Registration is atomic: concurrent callers all receive the same
  /// instance and `init` runs at most once. `init` runs without any registry
  /// lock held, so it may use the context itself.
  pub fn get_or_provide<T, F>(&self, init: F) -> Result<Arc<T>>
  where
    T: Any + Send + Sync,
    F: FnOnce() -> T + Send + 'static,
  {
    let key = ServiceKey::of::<T>(None);
    self.providers.entry(key.clone()).or_insert_with(|| {
      tracing::debug!(service = type_name::<T>(), "service registered with its default");
      // The cell of the lazy provider guarantees a single caller takes `init`.
      let slot = Mutex::new(Some(init));
      Arc::new(Provider::lazy(Box::new(move |_: &Context| -> Result<AnyService> {
        let init = slot.lock().take();
        match init {
          Some(init) => Ok(Box::new(Arc::new(init()))),
          None => Err(ContextError::Missing {
            type_name: type_name::<T>(),
            name: None,
          }),
        }
      })))
    });
    self.resolve_key(key)
  }

  // --- Introspection ---

  /// Whether an unnamed `T` is registered, built or not.
  pub fn contains<T: ?Sized + Any + Send + Sync>(&self) -> bool {
    self.providers.contains_key(&ServiceKey::of::<T>(None))
  }

  /// Whether `T` is registered and already built.
  pub fn is_built<T: ?Sized + Any + Send + Sync>(&self) -> bool {
    self
      .providers
      .get(&ServiceKey::of::<T>(None))
      .is_some_and(|entry| entry.value().is_built())
  }

  /// Number of registrations.
  pub fn len(&self) -> usize {
    self.providers.len()
  }

  /// Whether nothing is registered.
  pub fn is_empty(&self) -> bool {
    self.providers.is_empty()
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("id", &self.id)
      .field("services", &self.providers.len())
      .finish()
  }
}
