//! The embedded database handle, as seen by the rest of the front end.
//!
//! The handle is opaque: it is created by the host, attached to a
//! [`Context`], and handed back out. Nothing here queries it.

use crate::context::Context;
use crate::error::Result;

use std::sync::Arc;

/// An embedded database owned by the host application.
pub trait Database: Send + Sync + 'static {
  /// A short label used in logs.
  fn label(&self) -> &str {
    "database"
  }
}

impl Context {
  /// Attaches the database handle, replacing any earlier one.
  pub fn attach_database(&self, database: Arc<dyn Database>) {
    tracing::debug!(database = database.label(), "database attached");
    self.provide_shared::<dyn Database>(database);
  }

  /// The attached database, if any.
  pub fn database(&self) -> Option<Arc<dyn Database>> {
    self.get::<dyn Database>()
  }

  /// The attached database, or [`ContextError::Missing`](crate::ContextError::Missing).
  pub fn require_database(&self) -> Result<Arc<dyn Database>> {
    self.require::<dyn Database>()
  }
}
