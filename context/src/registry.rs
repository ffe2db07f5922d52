//! Registry internals: keys, providers and the re-entrancy guard.

use crate::context::Context;
use crate::error::{ContextError, Result};

use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

pub(crate) type AnyService = Box<dyn Any + Send + Sync>;
pub(crate) type Factory = Box<dyn Fn(&Context) -> Result<AnyService> + Send + Sync>;

thread_local! {
  // Services this thread is currently building, tagged with their context.
  static RESOLVING: RefCell<HashSet<(u64, ServiceKey)>> = RefCell::new(HashSet::new());
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct ServiceKey {
  type_id: TypeId,
  name: Option<String>,
}

impl ServiceKey {
  pub(crate) fn of<T: ?Sized + Any>(name: Option<&str>) -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      name: name.map(str::to_owned),
    }
  }

  pub(crate) fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Key({:?}, {:?})", self.type_id, name),
      None => write!(f, "Key({:?})", self.type_id),
    }
  }
}

/// Marks a service as being built on this thread; unmarks it on drop.
pub(crate) struct ResolutionGuard {
  entry: (u64, ServiceKey),
}

impl ResolutionGuard {
  pub(crate) fn enter(context_id: u64, key: &ServiceKey, type_name: &'static str) -> Result<Self> {
    let entry = (context_id, key.clone());
    let fresh = RESOLVING.with(|set| set.borrow_mut().insert(entry.clone()));
    if !fresh {
      tracing::warn!(service = type_name, "circular dependency detected");
      return Err(ContextError::Circular { type_name });
    }
    Ok(Self { entry })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|set| {
      set.borrow_mut().remove(&self.entry);
    });
  }
}

/// How a registered service is produced. Every variant yields a boxed
/// `Arc<T>` so trait objects and sized types are handled alike.
pub(crate) enum Provider {
  Instance(AnyService),
  Lazy {
    cell: OnceCell<AnyService>,
    factory: Factory,
  },
}

impl Provider {
  pub(crate) fn instance(service: AnyService) -> Self {
    Provider::Instance(service)
  }

  pub(crate) fn lazy(factory: Factory) -> Self {
    Provider::Lazy {
      cell: OnceCell::new(),
      factory,
    }
  }

  /// Returns the service, building it first if this is an unbuilt lazy
  /// provider. A failed build leaves the provider unbuilt.
  pub(crate) fn resolve(&self, context: &Context) -> Result<&AnyService> {
    match self {
      Provider::Instance(service) => Ok(service),
      Provider::Lazy { cell, factory } => cell.get_or_try_init(|| factory(context)),
    }
  }

  pub(crate) fn is_built(&self) -> bool {
    match self {
      Provider::Instance(_) => true,
      Provider::Lazy { cell, .. } => cell.get().is_some(),
    }
  }
}
