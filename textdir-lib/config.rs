//! Engine configuration.

use indexmap::IndexSet;
use serde::{
  Deserialize,
  Serialize,
};
use textdir_core::direction::Direction;

use crate::Tendril;

/// Behavior knobs for the direction engine and the direction commands.
///
/// The default configuration manages no node types at all, which makes the
/// engine inert; hosts opt node types in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
  /// Node type names whose `dir` attribute the engine manages.
  pub types:   IndexSet<Tendril>,
  /// Direction values commands accept. Values outside this set are
  /// rejected without touching the document.
  pub allowed: IndexSet<Direction>,
  /// Base direction of the surrounding context. A `dir` value equal to
  /// this is elided when rendering attributes.
  pub default: Option<Direction>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      types:   IndexSet::new(),
      allowed: IndexSet::from([Direction::Ltr, Direction::Rtl, Direction::Auto]),
      default: None,
    }
  }
}

impl Config {
  /// A default configuration managing the given node types.
  pub fn with_types<I, T>(types: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<Tendril>,
  {
    Self {
      types: types.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_manages_nothing() {
    let config = Config::default();
    assert!(config.types.is_empty());
    assert_eq!(config.allowed.len(), 3);
    assert_eq!(config.default, None);
  }

  #[test]
  fn deserializes_from_toml() {
    let config: Config = toml::from_str(
      r#"
        types = ["paragraph", "heading"]
        allowed = ["ltr", "rtl"]
        default = "ltr"
      "#,
    )
    .unwrap();

    assert!(config.types.contains("paragraph"));
    assert!(config.types.contains("heading"));
    assert!(config.allowed.contains(&Direction::Ltr));
    assert!(!config.allowed.contains(&Direction::Auto));
    assert_eq!(config.default, Some(Direction::Ltr));
  }

  #[test]
  fn omitted_fields_fall_back_to_defaults() {
    let config: Config = toml::from_str(r#"types = ["paragraph"]"#).unwrap();
    assert_eq!(config.allowed, Config::default().allowed);
    assert_eq!(config.default, None);
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(toml::from_str::<Config>(r#"typo = ["paragraph"]"#).is_err());
  }

  #[test]
  fn round_trips_through_json() {
    let config = Config {
      types:   ["paragraph"].into_iter().map(Tendril::from).collect(),
      allowed: IndexSet::from([Direction::Rtl]),
      default: Some(Direction::Rtl),
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
  }
}
