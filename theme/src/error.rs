//! Theme parsing errors.

use thiserror::Error;

/// A theme name outside the accepted set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid theme `{value}`, expected one of: Light, Dark")]
pub struct ThemeParseError {
  /// The rejected input.
  pub value: String,
}
