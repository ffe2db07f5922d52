mod common;
use common::*;

use vigil::{wait_until, CancelToken, ConditionWaiter, ConfigError, PollConfig, WaitError, WaitOutcome};

use pretty_assertions::assert_eq;
use tokio::time::{advance, timeout, Instant};

fn waiter(interval_ms: u64, deadline_ms: Option<u64>) -> ConditionWaiter {
  init_tracing();
  ConditionWaiter::new(PollConfig::new(interval_ms, deadline_ms).expect("valid config"))
}

// --- Settlement by condition ---

#[tokio::test(start_paused = true)]
async fn unbounded_wait_succeeds_on_first_tick_past_the_condition() {
  let waiter = waiter(10, None);
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter
    .wait(|| {
      calls += 1;
      start.elapsed() >= ms(35)
    })
    .await;

  assert_eq!(outcome, WaitOutcome::Succeeded);
  assert_eq!(calls, 4);
  let elapsed = start.elapsed();
  assert!(elapsed >= ms(40) && elapsed < ms(45), "settled at {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn success_takes_at_least_k_intervals() {
  for k in 1..=5u64 {
    let waiter = waiter(7, None);
    let start = Instant::now();
    let mut calls = 0;
    let outcome = waiter
      .wait(|| {
        calls += 1;
        calls == k
      })
      .await;
    assert_eq!(outcome, WaitOutcome::Succeeded);
    assert!(start.elapsed() >= ms(7 * k));
    assert_eq!(waiter.metrics().evaluations, k);
  }
}

#[tokio::test(start_paused = true)]
async fn first_evaluation_waits_one_interval() {
  let waiter = waiter(50, None);
  let start = Instant::now();
  let outcome = waiter.wait(|| true).await;
  assert_eq!(outcome, WaitOutcome::Succeeded);
  assert!(start.elapsed() >= ms(50));
}

// --- Settlement by deadline ---

#[tokio::test(start_paused = true)]
async fn never_true_times_out_at_the_deadline_tick() {
  let waiter = waiter(10, Some(30));
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter
    .wait(|| {
      calls += 1;
      false
    })
    .await;

  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 30 });
  // Ticks 1 and 2 evaluate; tick 3 reaches the deadline first.
  assert_eq!(calls, 2);
  let elapsed = start.elapsed();
  assert!(elapsed >= ms(30) && elapsed < ms(35), "settled at {:?}", elapsed);

  let metrics = waiter.metrics();
  assert_eq!(metrics.ticks, 3);
  assert_eq!(metrics.timed_out, 1);
  assert_eq!(metrics.active_timers, 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_tick_wins_over_a_condition_that_just_became_true() {
  let waiter = waiter(10, Some(30));
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter
    .wait(|| {
      calls += 1;
      start.elapsed() >= ms(30)
    })
    .await;

  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 30 });
  assert_eq!(calls, 2);
}

#[tokio::test(start_paused = true)]
async fn deadline_not_a_multiple_of_the_interval() {
  let waiter = waiter(10, Some(25));
  let mut calls = 0;
  let outcome = waiter
    .wait(|| {
      calls += 1;
      false
    })
    .await;
  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 25 });
  assert_eq!(calls, 2);
}

// Interval 5ms, deadline 20ms: ticks land on 5, 10, 15 and 20. Both sides of
// the last boundary are pinned down.

#[tokio::test(start_paused = true)]
async fn boundary_condition_true_by_tick_three_succeeds() {
  let waiter = waiter(5, Some(20));
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter
    .wait(|| {
      calls += 1;
      start.elapsed() >= ms(15)
    })
    .await;

  assert_eq!(outcome, WaitOutcome::Succeeded);
  assert_eq!(calls, 3);
}

#[tokio::test(start_paused = true)]
async fn boundary_condition_true_at_18ms_is_first_seen_on_the_deadline_tick() {
  let waiter = waiter(5, Some(20));
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter
    .wait(|| {
      calls += 1;
      start.elapsed() >= ms(18)
    })
    .await;

  // Tick 4 lands on t=20, where the deadline check runs before the predicate.
  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 20 });
  assert_eq!(calls, 3);
}

// --- Cleanup ---

#[tokio::test(start_paused = true)]
async fn no_evaluations_after_settlement() {
  let waiter = waiter(10, Some(50));
  let calls = std::cell::Cell::new(0u32);

  let outcome = waiter
    .wait(|| {
      calls.set(calls.get() + 1);
      calls.get() == 2
    })
    .await;
  assert_eq!(outcome, WaitOutcome::Succeeded);

  advance(ms(500)).await;
  tokio::task::yield_now().await;

  assert_eq!(calls.get(), 2);
  let metrics = waiter.metrics();
  assert_eq!(metrics.ticks, 2);
  assert_eq!(metrics.settled(), 1);
  assert_eq!(metrics.active_timers, 0);
  assert_eq!(metrics.timers_released, 1);
}

#[tokio::test(start_paused = true)]
async fn each_wait_owns_exactly_one_timer() {
  let waiter = waiter(10, Some(100));

  let outcome = waiter
    .wait(|| {
      assert_eq!(waiter.metrics().active_timers, 1);
      true
    })
    .await;
  assert_eq!(outcome, WaitOutcome::Succeeded);

  let mut seen = 0;
  let (a, b) = tokio::join!(
    waiter.wait(|| {
      seen = seen.max(waiter.metrics().active_timers);
      false
    }),
    waiter.wait(|| false),
  );
  assert!(a.is_timed_out() && b.is_timed_out());
  assert_eq!(seen, 2);
  assert_eq!(waiter.metrics().active_timers, 0);
  assert_eq!(waiter.metrics().timers_released, 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_wait_future_releases_its_timer() {
  let waiter = waiter(10, None);

  let res = timeout(ms(25), waiter.wait(|| false)).await;
  assert!(res.is_err(), "wait should still be pending");

  let metrics = waiter.metrics();
  assert_eq!(metrics.waits_started, 1);
  assert_eq!(metrics.active_timers, 0);
  assert_eq!(metrics.timers_released, 1);
  assert_eq!(metrics.settled(), 0);
}

// --- Failures ---

#[tokio::test(start_paused = true)]
async fn predicate_error_propagates_and_releases_the_timer() {
  let waiter = waiter(10, None);
  let mut calls = 0;

  let result = waiter
    .try_wait(
      || {
        calls += 1;
        if calls == 3 {
          Err("probe failed")
        } else {
          Ok(false)
        }
      },
      None,
    )
    .await;

  assert_eq!(result, Err("probe failed"));
  assert_eq!(calls, 3);
  let metrics = waiter.metrics();
  assert_eq!(metrics.failed, 1);
  assert_eq!(metrics.active_timers, 0);
}

#[tokio::test(start_paused = true)]
async fn predicate_panic_releases_the_timer() {
  let waiter = waiter(10, None);
  let task_waiter = waiter.clone();

  let handle = tokio::spawn(async move {
    let mut calls = 0;
    task_waiter
      .wait(|| {
        calls += 1;
        if calls == 2 {
          panic!("predicate blew up");
        }
        false
      })
      .await
  });

  let err = handle.await.expect_err("task should have panicked");
  assert!(err.is_panic());
  let metrics = waiter.metrics();
  assert_eq!(metrics.settled(), metrics.failed);
  assert_eq!(metrics.active_timers, 0);
  assert_eq!(metrics.timers_released, 1);
}

#[test]
fn zero_interval_fails_before_any_timer_exists() {
  // No runtime is running here: the error is reported without polling.
  let result = wait_until(|| true, 0, Some(100));
  assert!(matches!(result, Err(ConfigError::ZeroInterval)));

  let result = wait_until(|| true, 10, Some(0));
  assert!(matches!(result, Err(ConfigError::ZeroDeadline)));
}

#[tokio::test(start_paused = true)]
async fn wait_until_validates_then_waits() {
  init_tracing();
  let mut calls = 0;
  let outcome = wait_until(
    || {
      calls += 1;
      false
    },
    10,
    Some(30),
  )
  .expect("valid config")
  .await;
  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 30 });
  assert_eq!(calls, 2);
}

// --- Cancellation ---

#[tokio::test(start_paused = true)]
async fn cancel_settles_as_canceled_and_stops_polling() {
  let waiter = waiter(10, None);
  let token = CancelToken::new();
  let remote = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(ms(25)).await;
    remote.cancel();
  });

  let mut calls = 0;
  let outcome = waiter
    .wait_with_cancel(
      || {
        calls += 1;
        false
      },
      &token,
    )
    .await;

  assert_eq!(outcome, WaitOutcome::Canceled);
  assert_eq!(calls, 2);
  let metrics = waiter.metrics();
  assert_eq!(metrics.canceled, 1);
  assert_eq!(metrics.active_timers, 0);
}

#[tokio::test(start_paused = true)]
async fn already_canceled_token_never_evaluates() {
  let waiter = waiter(10, Some(100));
  let token = CancelToken::new();
  token.cancel();

  let mut calls = 0;
  let outcome = waiter
    .wait_with_cancel(
      || {
        calls += 1;
        true
      },
      &token,
    )
    .await;

  assert_eq!(outcome, WaitOutcome::Canceled);
  assert_eq!(calls, 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_after_settlement_changes_nothing() {
  let waiter = waiter(10, None);
  let token = CancelToken::new();

  let outcome = waiter.wait_with_cancel(|| true, &token).await;
  token.cancel();

  assert_eq!(outcome, WaitOutcome::Succeeded);
  let metrics = waiter.metrics();
  assert_eq!(metrics.succeeded, 1);
  assert_eq!(metrics.canceled, 0);
}

#[tokio::test(start_paused = true)]
async fn one_token_cancels_many_waits() {
  let waiter = waiter(10, None);
  let token = CancelToken::new();
  let remote = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(ms(15)).await;
    remote.cancel();
  });

  let (a, b) = tokio::join!(
    waiter.wait_with_cancel(|| false, &token),
    waiter.wait_with_cancel(|| false, &token),
  );
  assert_eq!(a, WaitOutcome::Canceled);
  assert_eq!(b, WaitOutcome::Canceled);
  assert_eq!(waiter.metrics().active_timers, 0);
}

// --- Outcome encodings ---

// This helper historically existed in two shapes: one resolved to a bare
// boolean, the other rejected with a timeout reason. `WaitOutcome` is the
// single contract; both older shapes remain reachable as adapters and are
// checked here so neither silently drifts.
#[tokio::test(start_paused = true)]
async fn outcome_adapters_cover_both_historical_shapes() {
  let waiter = waiter(10, Some(20));

  let timed_out = waiter.wait(|| false).await;
  assert!(!timed_out.is_succeeded());
  assert_eq!(timed_out.into_result(), Err(WaitError::TimedOut { deadline_ms: 20 }));

  let succeeded = waiter.wait(|| true).await;
  assert!(bool::from(succeeded));
  assert_eq!(succeeded.into_result(), Ok(()));
}
