//! Resolution errors.

use thiserror::Error;

/// Errors raised while resolving a service from a [`Context`](crate::Context).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
  /// Nothing is registered under the requested type (and name).
  #[error("no service registered for `{type_name}` (name: {name:?})")]
  Missing {
    /// The requested type.
    type_name: &'static str,
    /// The requested name, if any.
    name: Option<String>,
  },

  /// A lazy service ended up requiring itself while being built.
  #[error("circular dependency while resolving `{type_name}`")]
  Circular {
    /// The type whose factory re-entered itself.
    type_name: &'static str,
  },
}

/// Result alias for context operations.
pub type Result<T, E = ContextError> = std::result::Result<T, E>;
