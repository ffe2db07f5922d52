use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared by every wait run through one
/// [`ConditionWaiter`](crate::ConditionWaiter).
#[derive(Debug, Default)]
pub(crate) struct Metrics {
  pub(crate) waits_started: AtomicU64,
  pub(crate) ticks: AtomicU64,
  pub(crate) evaluations: AtomicU64,

  // --- Settlements ---
  pub(crate) succeeded: AtomicU64,
  pub(crate) timed_out: AtomicU64,
  pub(crate) canceled: AtomicU64,
  pub(crate) failed: AtomicU64,

  // --- Timer ownership ---
  pub(crate) active_timers: AtomicU64,
  pub(crate) timers_released: AtomicU64,
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    MetricsSnapshot {
      waits_started: self.waits_started.load(Ordering::Relaxed),
      ticks: self.ticks.load(Ordering::Relaxed),
      evaluations: self.evaluations.load(Ordering::Relaxed),
      succeeded: self.succeeded.load(Ordering::Relaxed),
      timed_out: self.timed_out.load(Ordering::Relaxed),
      canceled: self.canceled.load(Ordering::Relaxed),
      failed: self.failed.load(Ordering::Relaxed),
      active_timers: self.active_timers.load(Ordering::Acquire),
      timers_released: self.timers_released.load(Ordering::Acquire),
    }
  }
}

/// A point-in-time copy of a waiter's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
  /// Waits that passed validation and started polling.
  pub waits_started: u64,
  /// Timer ticks observed across all waits.
  pub ticks: u64,
  /// Predicate calls across all waits.
  pub evaluations: u64,
  /// Waits whose predicate held.
  pub succeeded: u64,
  /// Waits that hit their deadline.
  pub timed_out: u64,
  /// Waits ended by their cancel token.
  pub canceled: u64,
  /// Waits ended by a predicate error or panic.
  pub failed: u64,
  /// Timers currently owned by in-flight waits.
  pub active_timers: u64,
  /// Timers released so far. Equals `waits_started` once every wait has ended.
  pub timers_released: u64,
}

impl MetricsSnapshot {
  /// Waits that reached a terminal outcome through any path.
  pub fn settled(&self) -> u64 {
    self.succeeded + self.timed_out + self.canceled + self.failed
  }
}

impl fmt::Display for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "waits={} ticks={} evals={} ok={} timeout={} canceled={} failed={} active_timers={}",
      self.waits_started,
      self.ticks,
      self.evaluations,
      self.succeeded,
      self.timed_out,
      self.canceled,
      self.failed,
      self.active_timers
    )
  }
}
