//! Wait for a condition to become true, or give up.
//!
//! `vigil` repeatedly evaluates a caller-supplied predicate on a fixed
//! interval until it returns `true` or an overall deadline elapses. Each wait
//! owns exactly one repeating timer and releases it on every exit path:
//! success, timeout, cancellation, a predicate error, a predicate panic, or
//! the wait future being dropped.
//!
//! On every tick the deadline is checked *before* the predicate, so a tick
//! that reaches the deadline settles as timed out even if the condition
//! would have held.
//!
//! ```
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use vigil::{ConditionWaiter, PollConfig, WaitOutcome};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ready = Arc::new(AtomicBool::new(false));
//! let flag = ready.clone();
//! tokio::spawn(async move {
//!   tokio::time::sleep(std::time::Duration::from_millis(25)).await;
//!   flag.store(true, Ordering::SeqCst);
//! });
//!
//! let waiter = ConditionWaiter::new(PollConfig::new(10, Some(1_000)).unwrap());
//! let outcome = waiter.wait(|| ready.load(Ordering::SeqCst)).await;
//! assert_eq!(outcome, WaitOutcome::Succeeded);
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod outcome;
pub mod waiter;

mod metrics;

pub use cancel::CancelToken;
pub use config::{Deadline, PollConfig, PollConfigBuilder};
pub use error::{ConfigError, WaitError};
pub use metrics::MetricsSnapshot;
pub use outcome::WaitOutcome;
pub use waiter::{wait_until, wait_until_blocking, ConditionWaiter};
