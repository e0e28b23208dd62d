//! Cursor ranges.
//!
//! A [`Range`] has an `anchor` and a `head`; when they are equal the range
//! is a point cursor. `from()`/`to()` return the bounds regardless of which
//! way the selection extends. After a batch is applied the range is mapped
//! through the batch's changeset so it keeps pointing at the same content.

use crate::transaction::{
  Assoc,
  ChangeSet,
  Result,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range.
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range.
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Map this range through a changeset. Both ends track `After`, so a
  /// cursor sitting at an insertion point ends up behind the typed text.
  pub fn map(self, changes: &ChangeSet) -> Result<Self> {
    if changes.is_empty() {
      return Ok(self);
    }
    Ok(Self {
      anchor: changes.map_pos(self.anchor, Assoc::After)?,
      head:   changes.map_pos(self.head, Assoc::After)?,
    })
  }
}
