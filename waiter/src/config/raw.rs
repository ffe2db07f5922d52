// Serde-facing shape of `PollConfig`. Durations may be given as bare
// milliseconds or as humantime strings ("250ms", "2s").

use super::{whole_millis, Deadline, PollConfig};
use crate::error::ConfigError;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum DurationRaw {
  Millis(u64),
  Human(String),
}

impl DurationRaw {
  fn to_millis(&self, field: &'static str) -> Result<u64, ConfigError> {
    match self {
      DurationRaw::Millis(ms) => Ok(*ms),
      DurationRaw::Human(text) => {
        let duration = humantime::parse_duration(text).map_err(|e| ConfigError::InvalidDuration {
          field,
          message: e.to_string(),
        })?;
        whole_millis(field, duration)
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PollConfigRaw {
  #[serde(alias = "interval_ms")]
  interval: DurationRaw,
  #[serde(default, alias = "deadline_ms")]
  deadline: Option<DurationRaw>,
}

impl TryFrom<PollConfigRaw> for PollConfig {
  type Error = ConfigError;

  fn try_from(raw: PollConfigRaw) -> Result<Self, Self::Error> {
    let interval_ms = raw.interval.to_millis("interval")?;
    let deadline_ms = raw
      .deadline
      .as_ref()
      .map(|deadline| deadline.to_millis("deadline"))
      .transpose()?;
    PollConfig::new(interval_ms, deadline_ms)
  }
}

impl From<PollConfig> for PollConfigRaw {
  fn from(config: PollConfig) -> Self {
    Self {
      interval: DurationRaw::Millis(config.interval_ms()),
      deadline: match config.deadline() {
        Deadline::Unbounded => None,
        Deadline::After(ms) => Some(DurationRaw::Millis(ms)),
      },
    }
  }
}
