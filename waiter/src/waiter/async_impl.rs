use super::core::{timer_period, PollState};
use super::ConditionWaiter;
use crate::cancel::CancelToken;
use crate::outcome::WaitOutcome;

use std::convert::Infallible;
use tokio::time::{self, Instant, MissedTickBehavior};

impl ConditionWaiter {
  /// Polls `predicate` every interval until it returns `true` or the
  /// deadline is reached.
  ///
  /// The first evaluation happens one interval after the call, not
  /// immediately. The returned future owns the only timer of this wait;
  /// dropping it mid-wait releases the timer.
  pub async fn wait<P>(&self, mut predicate: P) -> WaitOutcome
  where
    P: FnMut() -> bool,
  {
    let result = self
      .try_wait(|| Ok::<_, Infallible>(predicate()), None)
      .await;
    match result {
      Ok(outcome) => outcome,
      Err(never) => match never {},
    }
  }

  /// Like [`wait`](Self::wait), but also settles as
  /// [`WaitOutcome::Canceled`] once `cancel` fires.
  pub async fn wait_with_cancel<P>(&self, mut predicate: P, cancel: &CancelToken) -> WaitOutcome
  where
    P: FnMut() -> bool,
  {
    let result = self
      .try_wait(|| Ok::<_, Infallible>(predicate()), Some(cancel))
      .await;
    match result {
      Ok(outcome) => outcome,
      Err(never) => match never {},
    }
  }

  /// Polls a fallible predicate.
  ///
  /// An `Err` from the predicate ends the wait immediately, releases the
  /// timer and is returned as-is. On each tick, cancellation is observed
  /// first, then the deadline, then the predicate.
  pub async fn try_wait<P, E>(
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
    let mut ticker = time::interval_at(Instant::now() + period, period);
    // Late ticks fire back to back, keeping `tick * interval` in step with
    // elapsed time.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut signal = cancel.map(CancelToken::canceled);

    loop {
      let ticked = match signal.as_mut() {
        Some(canceled) => tokio::select! {
          biased;
          _ = canceled => false,
          _ = ticker.tick() => true,
        },
        None => {
          ticker.tick().await;
          true
        }
      };

      if !ticked || cancel.is_some_and(CancelToken::is_canceled) {
        return Ok(state.cancel());
      }
      if let Some(outcome) = state.on_tick(&mut predicate)? {
        return Ok(outcome);
      }
    }
  }
}
