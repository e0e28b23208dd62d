//! Strong-directional character classification.
//!
//! The block tables below are legacy compatibility tables, kept bit-exact so
//! that existing documents classify the same way they always have. They are
//! deliberately coarser than the Unicode bidi property: a handful of wide
//! ranges instead of per-character data.

use crate::direction::Direction;

/// Returns true if `ch` falls in the strongly right-to-left ranges
/// (Hebrew and Arabic blocks plus their presentation forms).
#[inline]
pub fn char_is_strong_rtl(ch: char) -> bool {
  matches!(ch,
    '\u{0591}'..='\u{07FF}'
    | '\u{FB1D}'..='\u{FDFD}'
    | '\u{FE70}'..='\u{FEFC}')
}

/// Returns true if `ch` falls in the strongly left-to-right ranges.
#[inline]
pub fn char_is_strong_ltr(ch: char) -> bool {
  matches!(ch,
    '\u{0041}'..='\u{005A}'
    | '\u{0061}'..='\u{007A}'
    | '\u{00C0}'..='\u{00D6}'
    | '\u{00D8}'..='\u{00F6}'
    | '\u{00F8}'..='\u{02B8}'
    | '\u{0300}'..='\u{0590}'
    | '\u{0800}'..='\u{1FFF}'
    | '\u{200E}'
    | '\u{2C00}'..='\u{FB1C}'
    | '\u{FE00}'..='\u{FE6F}'
    | '\u{FEFD}'..='\u{FFFF}')
}

/// Classifies `text` by its first strongly-directional character.
///
/// Returns `None` when no character in `text` is strongly directional,
/// which covers the empty string and purely numeric, punctuation, or
/// whitespace content. Digits and punctuation are direction-neutral and
/// simply skipped.
pub fn strong_direction(text: &str) -> Option<Direction> {
  for ch in text.chars() {
    if char_is_strong_rtl(ch) {
      return Some(Direction::Rtl);
    }
    if char_is_strong_ltr(ch) {
      return Some(Direction::Ltr);
    }
  }
  None
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn latin_is_ltr() {
    assert_eq!(strong_direction("Hello"), Some(Direction::Ltr));
    assert_eq!(strong_direction("x"), Some(Direction::Ltr));
  }

  #[test]
  fn hebrew_and_arabic_are_rtl() {
    assert_eq!(strong_direction("שלום"), Some(Direction::Rtl));
    assert_eq!(strong_direction("سلام"), Some(Direction::Rtl));
  }

  #[test]
  fn neutral_content_is_unknown() {
    assert_eq!(strong_direction(""), None);
    assert_eq!(strong_direction("123"), None);
    assert_eq!(strong_direction("  \t ?!. 42"), None);
  }

  #[test]
  fn neutral_prefix_is_skipped() {
    assert_eq!(strong_direction("123 Hello"), Some(Direction::Ltr));
    assert_eq!(strong_direction("123 שלום"), Some(Direction::Rtl));
    assert_eq!(strong_direction("?! سلام no"), Some(Direction::Rtl));
  }

  #[test]
  fn first_strong_character_wins() {
    // Mixed content: the leading strong character decides, later script
    // changes are ignored.
    assert_eq!(strong_direction("Hello שלום"), Some(Direction::Ltr));
    assert_eq!(strong_direction("שלום Hello"), Some(Direction::Rtl));
  }

  #[test]
  fn table_edges() {
    // Hebrew accents start the rtl table, Arabic presentation forms end it.
    assert_eq!(strong_direction("\u{0591}"), Some(Direction::Rtl));
    assert_eq!(strong_direction("\u{07FF}"), Some(Direction::Rtl));
    assert_eq!(strong_direction("\u{FE70}"), Some(Direction::Rtl));
    assert_eq!(strong_direction("\u{FEFC}"), Some(Direction::Rtl));
    // The ltr-mark and the surrounding gaps.
    assert_eq!(strong_direction("\u{200E}"), Some(Direction::Ltr));
    assert_eq!(strong_direction("\u{200F}"), None);
    assert_eq!(strong_direction("\u{0040}"), None);
    assert_eq!(strong_direction("\u{00D7}"), None);
  }

  quickcheck::quickcheck! {
    fn matches_first_strong_char(text: String) -> bool {
      let expected = text.chars().find_map(|ch| {
        if char_is_strong_rtl(ch) {
          Some(Direction::Rtl)
        } else if char_is_strong_ltr(ch) {
          Some(Direction::Ltr)
        } else {
          None
        }
      });
      strong_direction(&text) == expected
    }

    fn rtl_prefix_classifies_rtl(tail: String) -> bool {
      let text = format!("ש{tail}");
      strong_direction(&text) == Some(Direction::Rtl)
    }

    fn neutral_prefix_does_not_change_result(text: String) -> bool {
      let prefixed = format!("  42?! {text}");
      strong_direction(&prefixed) == strong_direction(&text)
    }
  }
}
