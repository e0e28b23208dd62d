//! User-facing direction commands.
//!
//! These are the operations a host wires to its UI, typically keyboard
//! shortcuts like `Ctrl-Shift-X` for right-to-left and `Ctrl-Shift-Z` for
//! left-to-right. They write the `dir` attribute directly and commit on
//! their own, so each invocation is one undo step.
//!
//! Setting a direction creates an explicit override: the reconciliation
//! engine leaves it alone as long as the node has content. Unsetting only
//! removes the attribute; it does not re-run classification, so a cleared
//! node keeps no direction until the next edit touches it.

use textdir_core::direction::Direction;

use crate::{
  Tendril,
  attr::DIR_ATTR,
  config::Config,
  document::{
    Document,
    Result,
  },
  transaction::Transaction,
};

/// Where a command applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  /// The node containing this position.
  Point(usize),
  /// Every managed node intersecting this span.
  Span { from: usize, to: usize },
  /// The document cursor.
  Cursor,
}

impl Target {
  fn resolve(self, doc: &Document) -> (usize, usize) {
    match self {
      Target::Point(pos) => (pos, pos),
      Target::Span { from, to } => (from, to),
      Target::Cursor => {
        let cursor = doc.cursor();
        (cursor.from(), cursor.to())
      },
    }
  }
}

/// Sets an explicit direction on every managed node the target touches.
///
/// Returns `Ok(false)` without touching the document when `direction` is
/// not in `config.allowed`. A target containing no managed node succeeds
/// and changes nothing. Nodes already carrying exactly this value are
/// skipped so the command does not pollute history with no-op writes.
pub fn set_text_direction(
  doc: &mut Document,
  config: &Config,
  direction: Direction,
  target: Option<Target>,
) -> Result<bool> {
  if !config.allowed.contains(&direction) {
    tracing::debug!(%direction, "direction not allowed, ignoring");
    return Ok(false);
  }

  let writes = collect_targets(doc, config, target, |current| {
    current != Some(direction.as_str())
  });
  write_dir(doc, &writes, Some(Tendril::from(direction.as_str())))?;
  Ok(true)
}

/// Removes the explicit direction from every managed node the target
/// touches. Does not reclassify; the next edit inside the node will.
pub fn unset_text_direction(
  doc: &mut Document,
  config: &Config,
  target: Option<Target>,
) -> Result<bool> {
  let writes = collect_targets(doc, config, target, |current| current.is_some());
  write_dir(doc, &writes, None)?;
  Ok(true)
}

/// Positions of managed nodes in the target whose current raw `dir` value
/// passes `wants_write`.
fn collect_targets<F>(
  doc: &Document,
  config: &Config,
  target: Option<Target>,
  wants_write: F,
) -> Vec<usize>
where
  F: Fn(Option<&str>) -> bool,
{
  let (from, to) = target.unwrap_or(Target::Cursor).resolve(doc);
  let mut positions = Vec::new();
  doc.root().nodes_between(from, to, &mut |node, pos| {
    let managed = node.kind().is_some_and(|kind| config.types.contains(kind));
    if managed && wants_write(node.attr(DIR_ATTR)) {
      positions.push(pos);
    }
  });
  positions
}

fn write_dir(doc: &mut Document, positions: &[usize], value: Option<Tendril>) -> Result<()> {
  if positions.is_empty() {
    return Ok(());
  }
  let mut tx = Transaction::new();
  for &pos in positions {
    tx = tx.set_attr(pos, DIR_ATTR, value.clone());
  }
  doc.apply_transaction(&tx)?;
  doc.commit();
  Ok(())
}
