use super::core::{timer_period, PollState};
use super::ConditionWaiter;
use crate::cancel::CancelToken;
use crate::outcome::WaitOutcome;

use std::convert::Infallible;
use std::thread;
use std::time::{Duration, Instant};

impl ConditionWaiter {
  /// Blocking counterpart of [`wait`](Self::wait). Parks the calling thread
  /// between ticks.
  pub fn wait_blocking<P>(&self, mut predicate: P) -> WaitOutcome
  where
    P: FnMut() -> bool,
  {
    match self.try_wait_blocking(|| Ok::<_, Infallible>(predicate()), None) {
      Ok(outcome) => outcome,
      Err(never) => match never {},
    }
  }

  /// Blocking counterpart of [`wait_with_cancel`](Self::wait_with_cancel).
  /// A cancel from another thread wakes the waiter immediately.
  pub fn wait_blocking_with_cancel<P>(&self, mut predicate: P, cancel: &CancelToken) -> WaitOutcome
  where
    P: FnMut() -> bool,
  {
    match self.try_wait_blocking(|| Ok::<_, Infallible>(predicate()), Some(cancel)) {
      Ok(outcome) => outcome,
      Err(never) => match never {},
    }
  }

  /// Blocking counterpart of [`try_wait`](Self::try_wait).
  pub fn try_wait_blocking<P, E>(
    &self,
    mut predicate: P,
    cancel: Option<&CancelToken>,
  ) -> Result<WaitOutcome, E>
  where
    P: FnMut() -> Result<bool, E>,
  {
    let mut state = PollState::new(self.config, &self.metrics);
    state.begin();

    let period = timer_period(&self.config);
    let started = Instant::now();

    loop {
      // Fixed-rate schedule: tick n is due at `started + n * period`.
      let next_tick = tick_due(started, period, state.tick() + 1);
      let canceled = match cancel {
        Some(token) => token.park_until(next_tick),
        None => {
          sleep_until(next_tick);
          false
        }
      };

      if canceled {
        return Ok(state.cancel());
      }
      if let Some(outcome) = state.on_tick(&mut predicate)? {
        return Ok(outcome);
      }
    }
  }
}

fn tick_due(started: Instant, period: Duration, tick: u64) -> Instant {
  let offset = u32::try_from(tick)
    .ok()
    .and_then(|tick| period.checked_mul(tick))
    .unwrap_or(Duration::MAX);
  started
    .checked_add(offset)
    .unwrap_or_else(|| Instant::now() + period)
}

fn sleep_until(deadline: Instant) {
  let now = Instant::now();
  if deadline > now {
    thread::sleep(deadline - now);
  }
}
