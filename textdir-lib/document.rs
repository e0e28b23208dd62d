//! Document state and transformation API.
//!
//! A [`Document`] owns the node tree, the cursor, and the undo history,
//! and evolves through explicit [`Transaction`]s. Applying a transaction
//! mutates the tree and accumulates pending steps; [`Document::commit`]
//! closes the pending steps into one history revision. Several
//! transactions applied between commits therefore undo as a single unit,
//! which is how bookkeeping edits (like direction reconciliation) stay
//! atomic with the user edit that triggered them.
//!
//! ```
//! use textdir_lib::{
//!   document::Document,
//!   node::Node,
//!   transaction::Transaction,
//! };
//!
//! let mut doc = Document::new(Node::element_with("doc", vec![Node::element_with(
//!   "paragraph",
//!   vec![Node::text("hello")],
//! )]));
//!
//! let tx = Transaction::new().replace_text(6, 6, " world");
//! doc.apply_transaction(&tx).unwrap();
//! doc.commit();
//! assert_eq!(doc.root().text_content(), "hello world");
//! ```

use thiserror::Error;

use crate::{
  history::{
    History,
    HistoryJump,
    Revision,
  },
  node::{
    Node,
    NodeError,
  },
  selection::Range,
  transaction::{
    ChangeSet,
    Step,
    Transaction,
    TransactionError,
    step_map,
  },
};

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
  #[error(transparent)]
  Node(#[from] NodeError),
  #[error(transparent)]
  Transaction(#[from] TransactionError),
}

#[derive(Debug, Clone)]
pub struct Document {
  root:              Node,
  cursor:            Range,
  history:           History,
  pending:           Vec<Step>,
  pending_inversion: Vec<Step>,
  cursor_before:     Option<Range>,
  version:           u64,
}

impl Document {
  /// Creates a document from its root element. The root's own tokens are
  /// not addressable; positions run over `0..root.content_size()`.
  pub fn new(root: Node) -> Self {
    debug_assert!(root.is_element());
    Self {
      root,
      cursor: Range::point(0),
      history: History::default(),
      pending: Vec::new(),
      pending_inversion: Vec::new(),
      cursor_before: None,
      version: 0,
    }
  }

  pub fn root(&self) -> &Node {
    &self.root
  }

  pub fn cursor(&self) -> Range {
    self.cursor
  }

  pub fn set_cursor(&mut self, cursor: Range) {
    self.cursor = cursor;
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  /// Total number of addressable positions.
  pub fn size(&self) -> usize {
    self.root.content_size()
  }

  /// Applies a transaction's steps to the tree and returns the batch's net
  /// changeset. The steps stay pending until [`Document::commit`].
  ///
  /// The cursor is mapped through the changeset unless the transaction
  /// places it explicitly.
  pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<ChangeSet> {
    let mut net = ChangeSet::new(self.size());

    if !tx.is_empty() && self.cursor_before.is_none() {
      self.cursor_before = Some(self.cursor);
    }

    for step in tx.steps() {
      let (inverse, map) = Self::apply_step(&mut self.root, step)?;
      self.pending.push(step.clone());
      self.pending_inversion.push(inverse);
      net = net.compose(map)?;
    }

    self.cursor = match tx.cursor() {
      Some(cursor) => cursor,
      None => self.cursor.map(&net)?,
    };

    if !tx.is_empty() {
      self.version = self.version.saturating_add(1);
    }

    Ok(net)
  }

  /// Closes the pending steps into one history revision. A no-op when
  /// nothing is pending.
  pub fn commit(&mut self) {
    if self.pending.is_empty() {
      self.cursor_before = None;
      return;
    }

    let steps = std::mem::take(&mut self.pending);
    let mut inversion = std::mem::take(&mut self.pending_inversion);
    inversion.reverse();
    let cursor_before = self.cursor_before.take().unwrap_or(self.cursor);

    self.history.commit_revision(Revision {
      steps,
      inversion,
      cursor_before,
      cursor_after: self.cursor,
    });
  }

  pub fn undo(&mut self) -> Result<bool> {
    let Some(jump) = self.history.undo() else {
      return Ok(false);
    };
    self.apply_history_jump(&jump)?;
    self.history.apply_jump(&jump);
    Ok(true)
  }

  pub fn redo(&mut self) -> Result<bool> {
    let Some(jump) = self.history.redo() else {
      return Ok(false);
    };
    self.apply_history_jump(&jump)?;
    self.history.apply_jump(&jump);
    Ok(true)
  }

  fn apply_history_jump(&mut self, jump: &HistoryJump) -> Result<()> {
    debug_assert!(self.pending.is_empty(), "history jump with pending steps");
    for step in &jump.steps {
      Self::apply_step(&mut self.root, step)?;
    }
    self.pending.clear();
    self.pending_inversion.clear();
    self.cursor_before = None;
    self.cursor = jump.cursor;
    self.version = self.version.saturating_add(1);
    Ok(())
  }

  /// Applies one step, returning its inverse and its position map.
  fn apply_step(root: &mut Node, step: &Step) -> Result<(Step, ChangeSet)> {
    let size = root.content_size();
    match step {
      Step::ReplaceText { from, to, text } => {
        let removed = root.replace_text(*from, *to, text)?;
        let inserted = text.chars().count();
        let inverse = Step::ReplaceText {
          from: *from,
          to:   from + inserted,
          text: removed,
        };
        Ok((inverse, step_map(size, *from, *to, inserted)?))
      },
      Step::InsertNode { pos, node } => {
        root.insert_node_at(*pos, node.clone())?;
        let inverse = Step::RemoveNode { pos: *pos };
        Ok((inverse, step_map(size, *pos, *pos, node.size())?))
      },
      Step::RemoveNode { pos } => {
        let removed = root.remove_node_at(*pos)?;
        let removed_size = removed.size();
        let inverse = Step::InsertNode {
          pos:  *pos,
          node: removed,
        };
        Ok((inverse, step_map(size, *pos, pos + removed_size, 0)?))
      },
      Step::SetAttr { pos, name, value } => {
        let old = root
          .set_attr_at(*pos, name, value.as_deref())
          .ok_or(NodeError::NoNodeAt { pos: *pos })?;
        let inverse = Step::SetAttr {
          pos:   *pos,
          name:  name.clone(),
          value: old,
        };
        // Attribute writes occupy no positions.
        Ok((inverse, ChangeSet::new(size)))
      },
    }
  }
}
