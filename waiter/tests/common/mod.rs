#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness. Set `RUST_LOG=vigil=trace`
/// to see every tick.
pub fn init_tracing() {
  TRACING.call_once(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_test_writer()
      .try_init();
  });
}

pub const fn ms(millis: u64) -> Duration {
  Duration::from_millis(millis)
}
