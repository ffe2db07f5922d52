//! Validated polling configuration.

#[cfg(feature = "serde")]
mod raw;

use crate::error::ConfigError;

use std::time::Duration;

/// Interval used by [`PollConfigBuilder`] when none is given.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// The total time budget of a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Deadline {
  /// Never give up.
  #[default]
  Unbounded,
  /// Give up once this many milliseconds of ticks have elapsed.
  After(u64),
}

impl Deadline {
  /// The deadline in milliseconds, or `None` when unbounded.
  #[inline]
  pub fn as_millis(&self) -> Option<u64> {
    match self {
      Deadline::Unbounded => None,
      Deadline::After(ms) => Some(*ms),
    }
  }

  /// Whether there is no deadline.
  #[inline]
  pub fn is_unbounded(&self) -> bool {
    matches!(self, Deadline::Unbounded)
  }
}

impl From<Option<u64>> for Deadline {
  fn from(deadline_ms: Option<u64>) -> Self {
    match deadline_ms {
      Some(ms) => Deadline::After(ms),
      None => Deadline::Unbounded,
    }
  }
}

/// An immutable, validated polling configuration.
///
/// `interval_ms` is always strictly positive, and a bounded deadline is
/// always strictly positive. Construction is the only place a
/// [`ConfigError`] can arise, so a wait holding a `PollConfig` can never
/// fail on configuration grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Deserialize, serde::Serialize),
  serde(try_from = "raw::PollConfigRaw", into = "raw::PollConfigRaw")
)]
pub struct PollConfig {
  interval_ms: u64,
  deadline: Deadline,
}

impl PollConfig {
  /// Creates a config from raw millisecond values. `None` means no deadline.
  pub fn new(interval_ms: u64, deadline_ms: Option<u64>) -> Result<Self, ConfigError> {
    Self::with_deadline(interval_ms, Deadline::from(deadline_ms))
  }

  /// Creates a config with an explicit [`Deadline`].
  pub fn with_deadline(interval_ms: u64, deadline: Deadline) -> Result<Self, ConfigError> {
    if interval_ms == 0 {
      return Err(ConfigError::ZeroInterval);
    }
    if deadline == Deadline::After(0) {
      return Err(ConfigError::ZeroDeadline);
    }
    Ok(Self {
      interval_ms,
      deadline,
    })
  }

  /// Starts a [`PollConfigBuilder`].
  pub fn builder() -> PollConfigBuilder {
    PollConfigBuilder::default()
  }

  /// The poll interval in milliseconds.
  #[inline]
  pub fn interval_ms(&self) -> u64 {
    self.interval_ms
  }

  /// The poll interval.
  #[inline]
  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }

  /// The overall deadline.
  #[inline]
  pub fn deadline(&self) -> Deadline {
    self.deadline
  }

  /// Whether the deadline has been reached once `tick` ticks have fired.
  #[inline]
  pub(crate) fn deadline_reached(&self, tick: u64) -> bool {
    match self.deadline {
      Deadline::Unbounded => false,
      Deadline::After(deadline_ms) => tick.saturating_mul(self.interval_ms) >= deadline_ms,
    }
  }
}

/// A builder for [`PollConfig`] taking `Duration`s.
///
/// Durations are truncated to whole milliseconds; anything non-zero but
/// shorter than a millisecond is rejected.
#[derive(Debug, Clone, Default)]
pub struct PollConfigBuilder {
  interval: Option<Duration>,
  deadline: Option<Duration>,
}

impl PollConfigBuilder {
  /// Sets the time between predicate evaluations.
  pub fn interval(mut self, interval: Duration) -> Self {
    self.interval = Some(interval);
    self
  }

  /// Sets the total time budget.
  pub fn deadline(mut self, deadline: Duration) -> Self {
    self.deadline = Some(deadline);
    self
  }

  /// Removes any deadline set earlier.
  pub fn unbounded(mut self) -> Self {
    self.deadline = None;
    self
  }

  /// Validates and builds the config.
  pub fn build(self) -> Result<PollConfig, ConfigError> {
    let interval_ms = match self.interval {
      Some(interval) => whole_millis("interval", interval)?,
      None => DEFAULT_INTERVAL_MS,
    };
    let deadline_ms = self
      .deadline
      .map(|deadline| whole_millis("deadline", deadline))
      .transpose()?;
    PollConfig::new(interval_ms, deadline_ms)
  }
}

/// Truncates `duration` to whole milliseconds. Zero passes through so the
/// caller reports the field-specific zero error.
pub(crate) fn whole_millis(field: &'static str, duration: Duration) -> Result<u64, ConfigError> {
  if duration.is_zero() {
    return Ok(0);
  }
  if duration < Duration::from_millis(1) {
    return Err(ConfigError::SubMillisecond {
      field,
      nanos: duration.subsec_nanos(),
    });
  }
  Ok(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
