//! The condition waiter: poll a predicate on a fixed interval until it holds,
//! the deadline passes, or the wait is canceled.
//!
//! Both an async mode (tokio timers) and a blocking mode (thread parking) are
//! provided; they share the same tick arithmetic and settlement rules.

mod async_impl;
mod core;
mod sync_impl;

use crate::config::PollConfig;
use crate::error::ConfigError;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::outcome::WaitOutcome;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Runs waits for one [`PollConfig`].
///
/// A waiter is cheap to clone; clones share the same metrics.
#[derive(Clone)]
pub struct ConditionWaiter {
  config: PollConfig,
  metrics: Arc<Metrics>,
}

impl ConditionWaiter {
  /// A waiter for `config`, with fresh metrics.
  pub fn new(config: PollConfig) -> Self {
    Self {
      config,
      metrics: Arc::new(Metrics::new()),
    }
  }

  /// The config every wait of this waiter uses.
  #[inline]
  pub fn config(&self) -> &PollConfig {
    &self.config
  }

  /// Returns a snapshot of the counters for every wait run by this waiter
  /// (and its clones).
  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot()
  }
}

impl fmt::Debug for ConditionWaiter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConditionWaiter")
      .field("config", &self.config)
      .field("metrics", &self.metrics.snapshot())
      .finish()
  }
}

/// Validates the configuration, then returns the wait as a future.
///
/// A zero interval (or a zero deadline) is reported here, synchronously,
/// before any timer exists:
///
/// ```
/// # async fn demo() -> Result<(), vigil::ConfigError> {
/// let mut polls = 0;
/// let outcome = vigil::wait_until(|| { polls += 1; polls == 3 }, 10, Some(1_000))?.await;
/// assert!(outcome.is_succeeded());
///
/// assert!(vigil::wait_until(|| true, 0, None).is_err());
/// # Ok(())
/// # }
/// ```
pub fn wait_until<P>(
  predicate: P,
  interval_ms: u64,
  deadline_ms: Option<u64>,
) -> Result<impl Future<Output = WaitOutcome>, ConfigError>
where
  P: FnMut() -> bool,
{
  let waiter = ConditionWaiter::new(PollConfig::new(interval_ms, deadline_ms)?);
  Ok(async move { waiter.wait(predicate).await })
}

/// Blocking form of [`wait_until`].
pub fn wait_until_blocking<P>(
  predicate: P,
  interval_ms: u64,
  deadline_ms: Option<u64>,
) -> Result<WaitOutcome, ConfigError>
where
  P: FnMut() -> bool,
{
  let waiter = ConditionWaiter::new(PollConfig::new(interval_ms, deadline_ms)?);
  Ok(waiter.wait_blocking(predicate))
}
