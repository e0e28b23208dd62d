//! Edit batches and the position-mapping changeset.
//!
//! A [`Transaction`] is an ordered batch of [`Step`]s applied atomically to
//! a document. Steps describe intent against the tree; the flat occupancy
//! of the document is tracked separately by [`ChangeSet`], a sequence of
//! operations:
//!
//! - **Retain(n)** - keep `n` positions unchanged
//! - **Delete(n)** - drop `n` positions
//! - **Insert(n)** - occupy `n` new positions
//!
//! Because the document is a tree rather than flat text, an insert records
//! only how many positions it occupies; the inserted content itself lives
//! in the step. The changeset exists for two jobs: mapping positions
//! between the snapshots before and after a batch ([`ChangeSet::map_pos`])
//! and diffing a batch into its touched regions
//! ([`ChangeSet::changes_iter`], consumed by [`crate::changes`]).
//!
//! # Composition
//!
//! Per-step maps compose into one net changeset for the whole batch when
//! the output length of the first matches the input length of the second:
//!
//! ```ignore
//! let net = step_a_map.compose(step_b_map)?;
//! ```
//!
//! # Pending formatting
//!
//! A transaction carries the host's transient `stored_marks` (formatting
//! queued to apply at the next typed character). Appending any step clears
//! them, mirroring how tree hosts invalidate pending formatting on every
//! document change; callers that append bookkeeping steps mid-batch are
//! expected to capture and restore them around each append.

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
  Tendril,
  node::Node,
};

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (old from, old to, inserted length) triple describing one change.
pub type Change = (usize, usize, usize);

/// Transient formatting state queued on a batch, by mark name.
pub type Marks = SmallVec<[Tendril; 2]>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("changeset length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error(
    "changeset compose length mismatch: left output {left_len_after}, right input {right_len}"
  )]
  ComposeLengthMismatch {
    left_len_after: usize,
    right_len:      usize,
  },
  #[error("invalid step range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("position {pos} is out of bounds for changeset length {len}")]
  PositionOutOfBounds { pos: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  /// Keep n positions.
  Retain(usize),

  /// Drop n positions.
  Delete(usize),

  /// Occupy n new positions.
  Insert(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Assoc {
  /// Stay before content inserted at this position.
  Before,
  /// Move after content inserted at this position.
  After,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  changes:   Vec<Operation>,
  /// The required document length. Composition and mapping refuse inputs
  /// unless it matches.
  len:       usize,
  len_after: usize,
}

impl ChangeSet {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      changes:   Vec::with_capacity(capacity),
      len:       0,
      len_after: 0,
    }
  }

  /// The identity changeset over a document of `len` positions.
  #[must_use]
  pub fn new(len: usize) -> Self {
    Self {
      changes: Vec::new(),
      len,
      len_after: len,
    }
  }

  pub fn changes(&self) -> &[Operation] {
    &self.changes
  }

  /// Expected document length for this changeset.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Document length after applying this changeset.
  pub fn len_after(&self) -> usize {
    self.len_after
  }

  // Changeset builder operations: delete/insert/retain.
  //

  pub fn delete(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Delete(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Delete(n))
    }
  }

  pub fn insert(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len_after += n;

    // Keep the insert-before-delete normal form so that an insert adjacent
    // to a delete always reads as a replacement.
    match self.changes.as_mut_slice() {
      [.., Insert(count)] | [.., Insert(count), Delete(_)] => *count += n,
      [.., last @ Delete(_)] => {
        let deletion = *last;
        *last = Insert(n);
        self.changes.push(deletion);
      },
      _ => self.changes.push(Insert(n)),
    }
  }

  pub fn retain(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;
    self.len_after += n;

    if let Some(Retain(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Retain(n))
    }
  }

  /// Combine two `ChangeSet` together.
  pub fn compose(self, other: Self) -> Result<Self> {
    // The output length of the first must match the input length of the
    // second.
    if self.len_after != other.len {
      return Err(TransactionError::ComposeLengthMismatch {
        left_len_after: self.len_after,
        right_len:      other.len,
      });
    }

    // Composing fails in weird ways if one of the sets is empty.
    if self.changes.is_empty() {
      return Ok(other);
    }
    if other.changes.is_empty() {
      return Ok(self);
    }

    let capacity = self.changes.len();

    let mut changes_a = self.changes.into_iter();
    let mut changes_b = other.changes.into_iter();

    let mut head_a = changes_a.next();
    let mut head_b = changes_b.next();

    let mut changes = Self::with_capacity(capacity);

    loop {
      use std::cmp::Ordering;

      use Operation::*;
      match (head_a, head_b) {
        // we are done
        (None, None) => {
          break;
        },
        // deletion in A
        (Some(Delete(i)), b) => {
          changes.delete(i);
          head_a = changes_a.next();
          head_b = b;
        },
        // insertion in B
        (a, Some(Insert(j))) => {
          changes.insert(j);
          head_a = a;
          head_b = changes_b.next();
        },
        (None, val) | (val, None) => unreachable!("({:?})", val),
        (Some(Retain(i)), Some(Retain(j))) => {
          match i.cmp(&j) {
            Ordering::Less => {
              changes.retain(i);
              head_a = changes_a.next();
              head_b = Some(Retain(j - i));
            },
            Ordering::Equal => {
              changes.retain(i);
              head_a = changes_a.next();
              head_b = changes_b.next();
            },
            Ordering::Greater => {
              changes.retain(j);
              head_a = Some(Retain(i - j));
              head_b = changes_b.next();
            },
          }
        },
        (Some(Insert(i)), Some(Delete(j))) => {
          match i.cmp(&j) {
            Ordering::Less => {
              head_a = changes_a.next();
              head_b = Some(Delete(j - i));
            },
            Ordering::Equal => {
              head_a = changes_a.next();
              head_b = changes_b.next();
            },
            Ordering::Greater => {
              head_a = Some(Insert(i - j));
              head_b = changes_b.next();
            },
          }
        },
        (Some(Insert(i)), Some(Retain(j))) => {
          match i.cmp(&j) {
            Ordering::Less => {
              changes.insert(i);
              head_a = changes_a.next();
              head_b = Some(Retain(j - i));
            },
            Ordering::Equal => {
              changes.insert(i);
              head_a = changes_a.next();
              head_b = changes_b.next();
            },
            Ordering::Greater => {
              changes.insert(j);
              head_a = Some(Insert(i - j));
              head_b = changes_b.next();
            },
          }
        },
        (Some(Retain(i)), Some(Delete(j))) => {
          match i.cmp(&j) {
            Ordering::Less => {
              changes.delete(i);
              head_a = changes_a.next();
              head_b = Some(Delete(j - i));
            },
            Ordering::Equal => {
              changes.delete(j);
              head_a = changes_a.next();
              head_b = changes_b.next();
            },
            Ordering::Greater => {
              changes.delete(j);
              head_a = Some(Retain(i - j));
              head_b = changes_b.next();
            },
          }
        },
      };
    }

    debug_assert!(changes.len == self.len);

    Ok(changes)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() || self.changes == [Operation::Retain(self.len)]
  }

  /// Map a position through the changes.
  ///
  /// `assoc` indicates which side to associate the position with. `Before`
  /// keeps the position in front of content inserted at that point, `After`
  /// moves it past the insertion.
  pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Result<usize> {
    use Operation::*;

    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut iter = self.changes.iter().peekable();

    while let Some(op) = iter.next() {
      match *op {
        Retain(n) => {
          if pos < old_pos + n {
            return Ok(new_pos + (pos - old_pos));
          }
          old_pos += n;
          new_pos += n;
        },
        Delete(n) => {
          if pos < old_pos + n {
            return Ok(new_pos);
          }
          old_pos += n;
        },
        Insert(n) => {
          // An insert directly followed by a delete is a replacement.
          if let Some(Delete(del)) = iter.peek() {
            let del = *del;
            iter.next();
            if pos < old_pos + del {
              let offset = match assoc {
                Assoc::Before => 0,
                Assoc::After => n,
              };
              return Ok(new_pos + offset);
            }
            old_pos += del;
          } else if pos == old_pos {
            let offset = match assoc {
              Assoc::Before => 0,
              Assoc::After => n,
            };
            return Ok(new_pos + offset);
          }
          new_pos += n;
        },
      }
    }

    // Positions past the last explicit operation sit in implicitly
    // retained territory.
    if pos >= old_pos && pos <= self.len {
      return Ok(new_pos + (pos - old_pos));
    }
    Err(TransactionError::PositionOutOfBounds { pos, len: self.len })
  }

  pub fn changes_iter(&self) -> ChangeIterator<'_> {
    ChangeIterator::new(self)
  }
}

pub struct ChangeIterator<'a> {
  iter: std::iter::Peekable<std::slice::Iter<'a, Operation>>,
  pos:  usize,
}

impl<'a> ChangeIterator<'a> {
  fn new(changeset: &'a ChangeSet) -> Self {
    let iter = changeset.changes.iter().peekable();
    Self { iter, pos: 0 }
  }
}

impl Iterator for ChangeIterator<'_> {
  type Item = Change;

  fn next(&mut self) -> Option<Self::Item> {
    use Operation::*;

    loop {
      match self.iter.next()? {
        Retain(n) => {
          self.pos += n;
        },
        Delete(n) => {
          let start = self.pos;
          self.pos += n;
          return Some((start, self.pos, 0));
        },
        Insert(n) => {
          let start = self.pos;
          // a subsequent delete means a replace, consume it
          if let Some(Delete(del)) = self.iter.peek() {
            let del = *del;
            self.iter.next();
            self.pos += del;
            return Some((start, self.pos, *n));
          } else {
            return Some((start, start, *n));
          }
        },
      }
    }
  }
}

/// One atomic edit against the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  /// Replace the characters in `from..to` (a span within one text run)
  /// with `text`. A pure insertion at a child boundary creates a run.
  ReplaceText {
    from: usize,
    to:   usize,
    text: Tendril,
  },
  /// Insert `node` at the child boundary `pos`.
  InsertNode { pos: usize, node: Node },
  /// Remove the element node whose span starts at `pos`.
  RemoveNode { pos: usize },
  /// Set or clear attribute `name` on the element starting at `pos`.
  /// Occupies no positions; maps to the identity changeset.
  SetAttr {
    pos:   usize,
    name:  Tendril,
    value: Option<Tendril>,
  },
}

/// An ordered batch of steps, applied and undone as one unit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  steps:        Vec<Step>,
  cursor:       Option<crate::selection::Range>,
  stored_marks: Option<Marks>,
}

impl Transaction {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn steps(&self) -> &[Step] {
    &self.steps
  }

  /// When set, explicitly places the cursor instead of mapping it.
  pub fn cursor(&self) -> Option<crate::selection::Range> {
    self.cursor
  }

  pub fn stored_marks(&self) -> Option<&Marks> {
    self.stored_marks.as_ref()
  }

  /// Appends a step. Any document change invalidates pending formatting,
  /// so this clears `stored_marks`.
  pub fn push(&mut self, step: Step) {
    self.stored_marks = None;
    self.steps.push(step);
  }

  #[must_use]
  pub fn replace_text(mut self, from: usize, to: usize, text: impl Into<Tendril>) -> Self {
    self.push(Step::ReplaceText {
      from,
      to,
      text: text.into(),
    });
    self
  }

  #[must_use]
  pub fn insert_node(mut self, pos: usize, node: Node) -> Self {
    self.push(Step::InsertNode { pos, node });
    self
  }

  #[must_use]
  pub fn remove_node(mut self, pos: usize) -> Self {
    self.push(Step::RemoveNode { pos });
    self
  }

  #[must_use]
  pub fn set_attr(mut self, pos: usize, name: impl Into<Tendril>, value: Option<Tendril>) -> Self {
    self.push(Step::SetAttr {
      pos,
      name: name.into(),
      value,
    });
    self
  }

  #[must_use]
  pub fn with_cursor(mut self, cursor: crate::selection::Range) -> Self {
    self.cursor = Some(cursor);
    self
  }

  #[must_use]
  pub fn with_stored_marks(mut self, marks: Marks) -> Self {
    self.stored_marks = Some(marks);
    self
  }

  pub fn set_stored_marks(&mut self, marks: Option<Marks>) {
    self.stored_marks = marks;
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// The changeset of a single step against a document of `size` positions.
pub fn step_map(size: usize, from: usize, to: usize, inserted: usize) -> Result<ChangeSet> {
  if from > to {
    return Err(TransactionError::InvalidRange { from, to });
  }
  let mut map = ChangeSet::with_capacity(4);
  map.retain(from);
  map.insert(inserted);
  map.delete(to - from);
  map.retain(size - to);
  Ok(map)
}

#[cfg(test)]
mod test {
  use smallvec::smallvec;

  use super::*;

  fn changeset(ops: &[Operation]) -> ChangeSet {
    use Operation::*;
    let mut cs = ChangeSet::with_capacity(ops.len());
    for op in ops {
      match op {
        Retain(n) => cs.retain(*n),
        Delete(n) => cs.delete(*n),
        Insert(n) => cs.insert(*n),
      }
    }
    cs
  }

  #[test]
  fn builder_merges_adjacent_operations() {
    use Operation::*;
    let cs = changeset(&[Retain(2), Retain(3), Delete(1), Delete(1), Insert(2)]);
    // The trailing insert swaps in front of the delete run.
    assert_eq!(cs.changes(), &[Retain(5), Insert(2), Delete(2)]);
    assert_eq!(cs.len(), 7);
    assert_eq!(cs.len_after(), 7);
  }

  #[test]
  fn composition() {
    use Operation::*;

    let a = changeset(&[Retain(5), Insert(6), Retain(1), Insert(3), Delete(2)]);
    let b = changeset(&[Delete(10), Insert(5), Retain(5)]);

    assert_eq!(a.len(), 8);
    assert_eq!(a.len_after(), 15);

    let composed = a.compose(b).unwrap();
    assert_eq!(composed.len(), 8);
    assert_eq!(composed.len_after(), 10);
  }

  #[test]
  fn compose_identity_is_neutral() {
    use Operation::*;
    let map = changeset(&[Retain(2), Insert(3), Delete(1), Retain(4)]);
    let id = ChangeSet::new(map.len());
    assert_eq!(id.compose(map.clone()).unwrap(), map);
    let id = ChangeSet::new(map.len_after());
    assert_eq!(map.clone().compose(id).unwrap(), map);
  }

  #[test]
  fn compose_length_mismatch() {
    use Operation::*;
    let a = changeset(&[Retain(3)]);
    let b = changeset(&[Retain(4)]);
    let err = a.compose(b).unwrap_err();
    assert_eq!(err, TransactionError::ComposeLengthMismatch {
      left_len_after: 3,
      right_len:      4,
    });
  }

  #[test]
  fn map_pos() {
    use Operation::*;

    // maps inserts
    let cs = changeset(&[Retain(4), Insert(2), Retain(4)]);
    assert_eq!(cs.map_pos(0, Assoc::Before).unwrap(), 0); // before insert region
    assert_eq!(cs.map_pos(4, Assoc::Before).unwrap(), 4); // at insert, track before
    assert_eq!(cs.map_pos(4, Assoc::After).unwrap(), 6); // at insert, track after
    assert_eq!(cs.map_pos(5, Assoc::Before).unwrap(), 7); // after insert region

    // maps deletes
    let cs = changeset(&[Retain(4), Delete(4), Retain(4)]);
    assert_eq!(cs.map_pos(0, Assoc::Before).unwrap(), 0); // at start
    assert_eq!(cs.map_pos(4, Assoc::Before).unwrap(), 4); // before a delete
    assert_eq!(cs.map_pos(5, Assoc::Before).unwrap(), 4); // inside a delete
    assert_eq!(cs.map_pos(5, Assoc::After).unwrap(), 4); // inside a delete
    assert_eq!(cs.map_pos(12, Assoc::Before).unwrap(), 8); // document end

    // replacements keep the gap start with Before
    let cs = changeset(&[Retain(2), Insert(3), Delete(1), Retain(2)]);
    assert_eq!(cs.map_pos(2, Assoc::Before).unwrap(), 2);
    assert_eq!(cs.map_pos(2, Assoc::After).unwrap(), 5);
    assert_eq!(cs.map_pos(3, Assoc::Before).unwrap(), 5);

    // identity maps everything to itself
    let cs = ChangeSet::new(9);
    assert_eq!(cs.map_pos(0, Assoc::Before).unwrap(), 0);
    assert_eq!(cs.map_pos(9, Assoc::After).unwrap(), 9);
    assert_eq!(
      cs.map_pos(10, Assoc::After).unwrap_err(),
      TransactionError::PositionOutOfBounds { pos: 10, len: 9 }
    );
  }

  #[test]
  fn changes_iter_yields_replacements() {
    use Operation::*;
    let cs = changeset(&[Retain(2), Insert(3), Delete(1), Retain(2), Delete(2), Retain(1)]);
    let changes: Vec<_> = cs.changes_iter().collect();
    assert_eq!(changes, vec![(2, 3, 3), (5, 7, 0)]);
  }

  #[test]
  fn step_map_spans() {
    use Operation::*;
    let map = step_map(9, 1, 1, 5).unwrap();
    assert_eq!(map.changes(), &[Retain(1), Insert(5), Retain(8)]);
    assert_eq!(map.len(), 9);
    assert_eq!(map.len_after(), 14);

    let map = step_map(9, 1, 6, 0).unwrap();
    assert_eq!(map.changes(), &[Retain(1), Delete(5), Retain(3)]);

    assert_eq!(
      step_map(9, 6, 1, 0).unwrap_err(),
      TransactionError::InvalidRange { from: 6, to: 1 }
    );
  }

  #[test]
  fn pushing_steps_clears_stored_marks() {
    let mut tx = Transaction::new().with_stored_marks(smallvec!["strong".into()]);
    assert!(tx.stored_marks().is_some());
    tx.push(Step::ReplaceText {
      from: 0,
      to:   0,
      text: "x".into(),
    });
    assert!(tx.stored_marks().is_none());
  }
}
