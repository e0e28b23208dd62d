//! The `dir` attribute: parsing stored values and rendering them back out.
//!
//! Stored attribute values are free-form strings, so reading one goes
//! through [`parse_dir`], which also filters values the configuration does
//! not allow. Rendering goes through [`render_dir`], which elides values
//! equal to the configured context default so markup only carries `dir`
//! where it changes something.

use textdir_core::direction::Direction;

use crate::config::Config;

/// Attribute name managed by this crate.
pub const DIR_ATTR: &str = "dir";

/// Interprets a raw stored attribute value against `config`.
///
/// Malformed values and values outside `config.allowed` normalize to the
/// configured default.
pub fn parse_dir(raw: Option<&str>, config: &Config) -> Option<Direction> {
  raw
    .and_then(|raw| raw.parse::<Direction>().ok())
    .filter(|dir| config.allowed.contains(dir))
    .or(config.default)
}

/// The value to write into rendered markup, or `None` to omit the
/// attribute entirely.
pub fn render_dir(value: Option<Direction>, config: &Config) -> Option<&'static str> {
  match value {
    Some(dir) if Some(dir) != config.default => Some(dir.as_str()),
    _ => None,
  }
}
