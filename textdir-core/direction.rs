use std::{
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

/// Dominant writing direction of a block of text.
///
/// `Auto` defers the decision to whatever renders the document; it is an
/// explicit value a user can pick, not the absence of one. "No direction"
/// is represented as `Option<Direction>::None` throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Ltr,
  Rtl,
  Auto,
}

impl Direction {
  pub const fn as_str(self) -> &'static str {
    match self {
      Direction::Ltr => "ltr",
      Direction::Rtl => "rtl",
      Direction::Auto => "auto",
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown direction value: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
  type Err = ParseDirectionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ltr" => Ok(Direction::Ltr),
      "rtl" => Ok(Direction::Rtl),
      "auto" => Ok(Direction::Auto),
      _ => Err(ParseDirectionError(s.to_string())),
    }
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
