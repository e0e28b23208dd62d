//! Incremental direction reconciliation.
//!
//! [`DirectionEngine`] keeps the `dir` attribute of configured node types
//! in sync with their text content as the document is edited. It runs
//! synchronously inside the handling of one edit batch, before that batch
//! is committed, so the attribute writes it stages land in the same undo
//! revision as the edit that triggered them.
//!
//! # How it works
//!
//! 1. The batch's steps are applied and composed into one net changeset.
//! 2. The changeset is diffed into changed ranges
//!    ([`crate::changes::changed_ranges`]), bounding the work to the
//!    edited region; reconciliation runs on every batch, so this is what
//!    keeps keystroke latency flat on large documents.
//! 3. Every managed-type element intersecting a changed range is
//!    re-examined against the *new* snapshot.
//! 4. Writes are appended to the same batch and applied before commit.
//!
//! # Override-wins policy
//!
//! A node that already carries an explicit direction *and* has non-empty
//! text is never reclassified: a direction somebody set on real content
//! stays until the user changes it or the content goes away. A node whose
//! text is empty is always eligible again, because an override on nothing
//! carries no intent worth preserving.
//!
//! # Pending formatting
//!
//! Appending a step to a batch clears its queued formatting marks (see
//! [`crate::transaction::Transaction::push`]). The engine captures the
//! marks before each staged write and restores them after, so a user
//! mid-edit does not lose queued formatting to a bookkeeping write.
//!
//! ```
//! use textdir_lib::{
//!   config::Config,
//!   document::Document,
//!   node::Node,
//!   reconcile::DirectionEngine,
//!   transaction::Transaction,
//! };
//!
//! let engine = DirectionEngine::new(Config::with_types(["paragraph"]));
//! let mut doc = Document::new(Node::element_with("doc", vec![Node::element(
//!   "paragraph",
//! )]));
//!
//! let mut tx = Transaction::new().replace_text(1, 1, "Hello");
//! engine.apply(&mut doc, &mut tx).unwrap();
//! assert_eq!(doc.root().children()[0].attr("dir"), Some("ltr"));
//! ```

use smallvec::SmallVec;
use textdir_core::{
  chars::strong_direction,
  direction::Direction,
};

use crate::{
  Tendril,
  attr::DIR_ATTR,
  changes::{
    ChangedRange,
    changed_ranges,
  },
  config::Config,
  document::{
    Document,
    Result,
  },
  transaction::{
    Step,
    Transaction,
  },
};

/// A staged attribute write: target node position and the new value.
type Write = (usize, Option<Direction>);

#[derive(Debug, Clone)]
pub struct DirectionEngine {
  config: Config,
}

impl DirectionEngine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Applies an edit batch to `doc`, reconciles direction attributes over
  /// the regions it touched, and commits everything as one revision.
  ///
  /// Staged writes are appended to `tx` itself, so the caller observes the
  /// augmented batch. Returns whether any attribute write was staged.
  pub fn apply(&self, doc: &mut Document, tx: &mut Transaction) -> Result<bool> {
    let changes = doc.apply_transaction(tx)?;
    let ranges = changed_ranges(&changes)?;

    let writes = self.stage_writes(doc, &ranges);
    let modified = !writes.is_empty();

    if modified {
      tracing::debug!("staging {} direction write(s)", writes.len());
      let appended_from = tx.steps().len();
      for (pos, value) in writes {
        // Appending a step clears the batch's queued formatting, so
        // bracket every write with a capture/restore.
        let marks = tx.stored_marks().cloned();
        tx.push(Step::SetAttr {
          pos,
          name: Tendril::from(DIR_ATTR),
          value: value.map(|dir| Tendril::from(dir.as_str())),
        });
        tx.set_stored_marks(marks);
      }

      let mut writes_tx = Transaction::new();
      for step in &tx.steps()[appended_from..] {
        writes_tx.push(step.clone());
      }
      doc.apply_transaction(&writes_tx)?;
    }

    doc.commit();
    Ok(modified)
  }

  /// Collects the attribute writes implied by `ranges` against the new
  /// snapshot. Does not mutate anything.
  fn stage_writes(&self, doc: &Document, ranges: &[ChangedRange]) -> Vec<Write> {
    let mut writes = Vec::new();
    if self.config.types.is_empty() || ranges.is_empty() {
      return writes;
    }

    // A node can intersect several ranges; stage it at most once.
    let mut staged: SmallVec<[usize; 4]> = SmallVec::new();

    for range in ranges {
      doc
        .root()
        .nodes_between(range.new_from, range.new_to, &mut |node, pos| {
          let Some(kind) = node.kind() else { return };
          if !self.config.types.contains(kind) || staged.contains(&pos) {
            return;
          }

          let text = node.text_content();
          let current = node
            .attr(DIR_ATTR)
            .and_then(|raw| raw.parse::<Direction>().ok());

          if current.is_some() && !text.is_empty() {
            tracing::trace!(pos, "explicit direction kept");
            return;
          }

          let detected = strong_direction(&text);
          if detected != current {
            tracing::trace!(pos, ?detected, "direction changed");
            staged.push(pos);
            writes.push((pos, detected));
          }
        });
    }

    writes
  }
}
