//! Changed-range extraction.
//!
//! Given the net changeset of an edit batch, produce the minimal set of
//! regions whose content differs between the snapshots before and after
//! the batch. Each region carries both coordinate spaces, because earlier
//! edits in a batch shift the positions of later ones. The ranges are
//! disjoint and emitted in ascending order, so consumers can walk just the
//! edited parts of the document instead of all of it.

use smallvec::SmallVec;

use crate::transaction::{
  Assoc,
  ChangeSet,
  Result,
};

/// One contiguous region touched by an edit batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedRange {
  /// Span in the pre-batch document.
  pub old_from: usize,
  pub old_to:   usize,
  /// Span in the post-batch document.
  pub new_from: usize,
  pub new_to:   usize,
}

/// Extracts the changed ranges of a batch from its net changeset.
///
/// A batch with no document-altering step yields no ranges.
pub fn changed_ranges(changes: &ChangeSet) -> Result<SmallVec<[ChangedRange; 4]>> {
  let mut out = SmallVec::new();
  if changes.is_empty() {
    return Ok(out);
  }

  for (old_from, old_to, inserted) in changes.changes_iter() {
    let new_from = changes.map_pos(old_from, Assoc::Before)?;
    out.push(ChangedRange {
      old_from,
      old_to,
      new_from,
      new_to: new_from + inserted,
    });
  }

  Ok(out)
}
