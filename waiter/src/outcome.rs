//! The settled result of a wait.

use crate::error::WaitError;

use std::fmt;

/// How a wait settled.
///
/// This is the single result shape of every wait in the crate. Timing out is
/// an expected outcome, not an error; callers that want the rejection style
/// can convert with [`into_result`](Self::into_result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
  /// The predicate returned `true` on some tick.
  Succeeded,
  /// The deadline was reached first.
  TimedOut {
    /// The configured deadline that elapsed.
    deadline_ms: u64,
  },
  /// The wait's cancellation token fired first.
  Canceled,
}

impl WaitOutcome {
  /// `true` only for [`WaitOutcome::Succeeded`].
  ///
  /// This is the boolean form: `true` for success, `false` for any other settlement.
  #[inline]
  pub fn is_succeeded(&self) -> bool {
    matches!(self, WaitOutcome::Succeeded)
  }

  /// Whether the deadline was reached first.
  #[inline]
  pub fn is_timed_out(&self) -> bool {
    matches!(self, WaitOutcome::TimedOut { .. })
  }

  /// Whether the wait was canceled.
  #[inline]
  pub fn is_canceled(&self) -> bool {
    matches!(self, WaitOutcome::Canceled)
  }

  /// Converts the outcome into `Ok(())` on success, or a [`WaitError`] otherwise.
  pub fn into_result(self) -> Result<(), WaitError> {
    match self {
      WaitOutcome::Succeeded => Ok(()),
      WaitOutcome::TimedOut { deadline_ms } => Err(WaitError::TimedOut { deadline_ms }),
      WaitOutcome::Canceled => Err(WaitError::Canceled),
    }
  }
}

impl fmt::Display for WaitOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WaitOutcome::Succeeded => write!(f, "succeeded"),
      WaitOutcome::TimedOut { deadline_ms } => write!(f, "timed out after {}ms", deadline_ms),
      WaitOutcome::Canceled => write!(f, "canceled"),
    }
  }
}

impl From<WaitOutcome> for bool {
  fn from(outcome: WaitOutcome) -> bool {
    outcome.is_succeeded()
  }
}
