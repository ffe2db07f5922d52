//! Configuration and wait errors.

use thiserror::Error;

/// Errors raised while validating a [`PollConfig`](crate::PollConfig).
///
/// These are always reported synchronously, before any timer is scheduled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
  /// The poll interval was zero. Ticks must be spaced by at least one millisecond.
  #[error("poll interval must be greater than zero")]
  ZeroInterval,

  /// A deadline of zero was given. Use `Deadline::Unbounded` to wait forever.
  #[error("deadline must be greater than zero when set")]
  ZeroDeadline,

  /// A duration was shorter than the one-millisecond tick resolution.
  #[error("{field} of {nanos}ns is below the 1ms resolution")]
  SubMillisecond {
    /// The offending field.
    field: &'static str,
    /// The duration that was given.
    nanos: u32,
  },

  /// A human-readable duration string could not be parsed.
  #[error("invalid duration for '{field}': {message}")]
  InvalidDuration {
    /// The offending field.
    field: &'static str,
    /// Why parsing failed.
    message: String,
  },
}

/// The rejection form of a settled wait, produced by
/// [`WaitOutcome::into_result`](crate::WaitOutcome::into_result).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
  /// The deadline was reached before the condition held.
  #[error("condition not met within {deadline_ms}ms")]
  TimedOut {
    /// The configured deadline that elapsed.
    deadline_ms: u64,
  },

  /// The wait was canceled through its [`CancelToken`](crate::CancelToken).
  #[error("wait was canceled")]
  Canceled,
}
