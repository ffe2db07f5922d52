use crate::error::ThemeParseError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The colour scheme of the interface.
///
/// The text form is exactly `"Light"` or `"Dark"`; anything else is rejected
/// when parsing or deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Theme {
  /// Dark text on a light background.
  Light,
  /// Light text on a dark background.
  #[default]
  Dark,
}

impl Theme {
  /// Every theme, in declaration order.
  pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

  /// The canonical text form.
  pub fn as_str(&self) -> &'static str {
    match self {
      Theme::Light => "Light",
      Theme::Dark => "Dark",
    }
  }

  /// The other theme.
  pub fn toggled(self) -> Theme {
    match self {
      Theme::Light => Theme::Dark,
      Theme::Dark => Theme::Light,
    }
  }
}

impl fmt::Display for Theme {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Theme {
  type Err = ThemeParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Theme::ALL
      .into_iter()
      .find(|theme| theme.as_str() == s)
      .ok_or_else(|| ThemeParseError { value: s.to_owned() })
  }
}

impl TryFrom<String> for Theme {
  type Error = ThemeParseError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}
