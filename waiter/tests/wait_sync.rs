mod common;
use common::*;

use vigil::{wait_until_blocking, CancelToken, ConditionWaiter, ConfigError, PollConfig, WaitOutcome};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn waiter(interval_ms: u64, deadline_ms: Option<u64>) -> ConditionWaiter {
  init_tracing();
  ConditionWaiter::new(PollConfig::new(interval_ms, deadline_ms).expect("valid config"))
}

#[test]
fn blocking_wait_times_out_without_evaluating_on_the_deadline_tick() {
  let waiter = waiter(5, Some(30));
  let start = Instant::now();
  let mut calls = 0;

  let outcome = waiter.wait_blocking(|| {
    calls += 1;
    false
  });

  assert_eq!(outcome, WaitOutcome::TimedOut { deadline_ms: 30 });
  assert_eq!(calls, 5);
  assert!(start.elapsed() >= ms(30));
  assert_eq!(waiter.metrics().active_timers, 0);
}

#[test]
fn blocking_wait_sees_a_flag_set_by_another_thread() {
  let waiter = waiter(5, Some(5_000));
  let ready = Arc::new(AtomicBool::new(false));
  let flag = ready.clone();
  let setter = thread::spawn(move || {
    thread::sleep(ms(20));
    flag.store(true, Ordering::SeqCst);
  });

  let outcome = waiter.wait_blocking(|| ready.load(Ordering::SeqCst));
  setter.join().unwrap();

  assert_eq!(outcome, WaitOutcome::Succeeded);
  assert_eq!(waiter.metrics().succeeded, 1);
  assert_eq!(waiter.metrics().active_timers, 0);
}

#[test]
fn blocking_cancel_wakes_the_waiter_early() {
  let waiter = waiter(1_000, None);
  let token = CancelToken::new();
  let remote = token.clone();
  let canceller = thread::spawn(move || {
    thread::sleep(ms(20));
    remote.cancel();
  });

  let start = Instant::now();
  let mut calls = 0;
  let outcome = waiter.wait_blocking_with_cancel(
    || {
      calls += 1;
      false
    },
    &token,
  );
  canceller.join().unwrap();

  assert_eq!(outcome, WaitOutcome::Canceled);
  assert_eq!(calls, 0);
  assert!(start.elapsed() < ms(900), "cancel did not wake the waiter");
  assert_eq!(waiter.metrics().active_timers, 0);
}

#[test]
fn blocking_predicate_error_propagates() {
  let waiter = waiter(1, None);
  let mut calls = 0;
  let result = waiter.try_wait_blocking(
    || {
      calls += 1;
      if calls == 2 {
        Err(std::io::Error::other("sensor offline"))
      } else {
        Ok(false)
      }
    },
    None,
  );

  let err = result.expect_err("predicate error should propagate");
  assert_eq!(err.to_string(), "sensor offline");
  assert_eq!(waiter.metrics().failed, 1);
  assert_eq!(waiter.metrics().active_timers, 0);
}

#[test]
fn blocking_predicate_panic_is_counted_as_failure() {
  let waiter = waiter(1, None);
  let result = panic::catch_unwind(AssertUnwindSafe(|| {
    waiter.wait_blocking(|| panic!("predicate blew up"))
  }));

  assert!(result.is_err());
  let metrics = waiter.metrics();
  assert_eq!(metrics.failed, 1);
  assert_eq!(metrics.active_timers, 0);
  assert_eq!(metrics.timers_released, 1);
}

#[test]
fn blocking_helper_validates_first() {
  assert_eq!(wait_until_blocking(|| true, 0, None), Err(ConfigError::ZeroInterval));
  assert_eq!(wait_until_blocking(|| true, 2, Some(50)), Ok(WaitOutcome::Succeeded));
}
