//! Linear undo history.
//!
//! The history is a vector of committed revisions plus a cursor into it.
//! Each revision stores the steps that produced it and a pre-computed
//! inversion (steps cannot be inverted without the document they applied
//! to, so the inversion is recorded at apply time).
//!
//! Navigation is split in two: [`History::undo`]/[`History::redo`] hand
//! out a [`HistoryJump`] without touching history state, and
//! [`History::apply_jump`] commits the move once the caller has applied
//! the steps successfully. This keeps history and document from diverging
//! when a step fails to apply.

use crate::{
  selection::Range,
  transaction::Step,
};

/// One committed edit batch.
#[derive(Debug, Clone)]
pub struct Revision {
  /// The steps of the batch, in application order.
  pub steps:         Vec<Step>,
  /// Steps that revert the batch, in application order.
  pub inversion:     Vec<Step>,
  pub cursor_before: Range,
  pub cursor_after:  Range,
}

/// A pending move through history that has not been applied yet.
#[derive(Debug, Clone)]
pub struct HistoryJump {
  /// The steps to apply, in order.
  pub steps:  Vec<Step>,
  /// Where the cursor lands after the jump.
  pub cursor: Range,
  /// The revision index the history moves to once the jump is applied.
  pub target: usize,
}

#[derive(Debug, Default, Clone)]
pub struct History {
  revisions: Vec<Revision>,
  current:   usize,
}

impl History {
  /// Number of committed revisions.
  pub fn len(&self) -> usize {
    self.revisions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.revisions.is_empty()
  }

  /// Index of the current revision; 0 is the pristine document.
  pub fn current(&self) -> usize {
    self.current
  }

  /// Commits a new revision after the current one, discarding any undone
  /// tail.
  pub fn commit_revision(&mut self, revision: Revision) {
    self.revisions.truncate(self.current);
    self.revisions.push(revision);
    self.current += 1;
  }

  pub fn undo(&self) -> Option<HistoryJump> {
    if self.current == 0 {
      return None;
    }
    let revision = &self.revisions[self.current - 1];
    Some(HistoryJump {
      steps:  revision.inversion.clone(),
      cursor: revision.cursor_before,
      target: self.current - 1,
    })
  }

  pub fn redo(&self) -> Option<HistoryJump> {
    if self.current == self.revisions.len() {
      return None;
    }
    let revision = &self.revisions[self.current];
    Some(HistoryJump {
      steps:  revision.steps.clone(),
      cursor: revision.cursor_after,
      target: self.current + 1,
    })
  }

  /// Moves the history cursor once a jump's steps have been applied.
  pub fn apply_jump(&mut self, jump: &HistoryJump) {
    debug_assert!(jump.target <= self.revisions.len());
    self.current = jump.target;
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::transaction::Step;

  fn revision(text: &str) -> Revision {
    Revision {
      steps:         vec![Step::ReplaceText {
        from: 0,
        to:   0,
        text: text.into(),
      }],
      inversion:     vec![Step::ReplaceText {
        from: 0,
        to:   text.chars().count(),
        text: "".into(),
      }],
      cursor_before: Range::point(0),
      cursor_after:  Range::point(text.chars().count()),
    }
  }

  #[test]
  fn undo_at_root_is_none() {
    let history = History::default();
    assert!(history.undo().is_none());
    assert!(history.redo().is_none());
  }

  #[test]
  fn undo_redo_walk() {
    let mut history = History::default();
    history.commit_revision(revision("a"));
    history.commit_revision(revision("b"));
    assert_eq!(history.current(), 2);

    let jump = history.undo().unwrap();
    assert_eq!(jump.target, 1);
    history.apply_jump(&jump);
    assert_eq!(history.current(), 1);

    let jump = history.redo().unwrap();
    assert_eq!(jump.target, 2);
    history.apply_jump(&jump);
    assert!(history.redo().is_none());
  }

  #[test]
  fn commit_discards_undone_tail() {
    let mut history = History::default();
    history.commit_revision(revision("a"));
    history.commit_revision(revision("b"));
    let jump = history.undo().unwrap();
    history.apply_jump(&jump);

    history.commit_revision(revision("c"));
    assert_eq!(history.len(), 2);
    assert_eq!(history.current(), 2);
    assert!(history.redo().is_none());
  }
}
