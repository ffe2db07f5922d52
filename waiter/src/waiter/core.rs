// Tick-by-tick state shared by the async and blocking waits.

use crate::config::PollConfig;
use crate::metrics::Metrics;
use crate::outcome::WaitOutcome;

use std::sync::atomic::Ordering;
use std::time::Duration;

/// Timers are never armed further out than this. Tick arithmetic still uses
/// the configured interval.
const MAX_TIMER_PERIOD: Duration = Duration::from_secs(86_400 * 365 * 30);

#[inline]
pub(super) fn timer_period(config: &PollConfig) -> Duration {
  config.interval().min(MAX_TIMER_PERIOD)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
  Idle,
  Polling,
  Settled(WaitOutcome),
  Failed,
}

/// Marks one armed timer in the metrics; released exactly once, on drop.
struct TimerLease<'a> {
  metrics: &'a Metrics,
}

impl<'a> TimerLease<'a> {
  fn acquire(metrics: &'a Metrics) -> Self {
    metrics.active_timers.fetch_add(1, Ordering::AcqRel);
    Self { metrics }
  }
}

impl Drop for TimerLease<'_> {
  fn drop(&mut self) {
    self.metrics.active_timers.fetch_sub(1, Ordering::AcqRel);
    self.metrics.timers_released.fetch_add(1, Ordering::AcqRel);
  }
}

/// The `Idle -> Polling -> {Succeeded, TimedOut, Canceled}` machine for a
/// single wait. `Failed` covers a predicate error or panic.
///
/// The caller owns the actual timer and drops it together with this state,
/// so every exit path (return, `?`, unwind, future dropped) releases both.
pub(super) struct PollState<'a> {
  config: PollConfig,
  tick: u64,
  phase: Phase,
  metrics: &'a Metrics,
  lease: Option<TimerLease<'a>>,
}

impl<'a> PollState<'a> {
  pub(super) fn new(config: PollConfig, metrics: &'a Metrics) -> Self {
    Self {
      config,
      tick: 0,
      phase: Phase::Idle,
      metrics,
      lease: None,
    }
  }

  /// Enters `Polling` and takes the timer lease.
  pub(super) fn begin(&mut self) {
    debug_assert_eq!(self.phase, Phase::Idle, "a wait can only begin once");
    Metrics::incr(&self.metrics.waits_started);
    self.lease = Some(TimerLease::acquire(self.metrics));
    self.phase = Phase::Polling;
    tracing::debug!(
      interval_ms = self.config.interval_ms(),
      deadline_ms = ?self.config.deadline().as_millis(),
      "wait started"
    );
  }

  #[inline]
  pub(super) fn tick(&self) -> u64 {
    self.tick
  }

  #[cfg(test)]
  pub(super) fn phase(&self) -> Phase {
    self.phase
  }

  /// Processes one timer tick. The deadline is checked before the
  /// predicate, so a tick that reaches the deadline never evaluates it.
  ///
  /// Returns `Some(outcome)` once settled; repeated calls after settlement
  /// return the same outcome without touching the predicate.
  pub(super) fn on_tick<P, E>(&mut self, predicate: &mut P) -> Result<Option<WaitOutcome>, E>
  where
    P: FnMut() -> Result<bool, E>,
  {
    match self.phase {
      Phase::Polling => {}
      Phase::Settled(outcome) => return Ok(Some(outcome)),
      Phase::Idle | Phase::Failed => return Ok(None),
    }

    self.tick += 1;
    Metrics::incr(&self.metrics.ticks);

    if self.config.deadline_reached(self.tick) {
      let deadline_ms = self.config.deadline().as_millis().unwrap_or_default();
      return Ok(Some(self.settle(WaitOutcome::TimedOut { deadline_ms })));
    }

    Metrics::incr(&self.metrics.evaluations);
    match predicate() {
      Ok(true) => Ok(Some(self.settle(WaitOutcome::Succeeded))),
      Ok(false) => {
        tracing::trace!(tick = self.tick, "condition not met yet");
        Ok(None)
      }
      Err(err) => {
        self.fail();
        Err(err)
      }
    }
  }

  /// Settles as canceled, unless already settled.
  pub(super) fn cancel(&mut self) -> WaitOutcome {
    match self.phase {
      Phase::Settled(outcome) => outcome,
      _ => self.settle(WaitOutcome::Canceled),
    }
  }

  fn settle(&mut self, outcome: WaitOutcome) -> WaitOutcome {
    let counter = match outcome {
      WaitOutcome::Succeeded => &self.metrics.succeeded,
      WaitOutcome::TimedOut { .. } => &self.metrics.timed_out,
      WaitOutcome::Canceled => &self.metrics.canceled,
    };
    Metrics::incr(counter);
    self.phase = Phase::Settled(outcome);
    self.lease = None;
    tracing::debug!(tick = self.tick, %outcome, "wait settled");
    outcome
  }

  fn fail(&mut self) {
    Metrics::incr(&self.metrics.failed);
    self.phase = Phase::Failed;
    self.lease = None;
    tracing::debug!(tick = self.tick, "predicate failed, wait abandoned");
  }
}

impl Drop for PollState<'_> {
  fn drop(&mut self) {
    if self.phase == Phase::Polling {
      if std::thread::panicking() {
        Metrics::incr(&self.metrics.failed);
        tracing::debug!(tick = self.tick, "predicate panicked, wait abandoned");
      } else {
        tracing::debug!(tick = self.tick, "wait dropped before settling");
      }
    }
  }
}
