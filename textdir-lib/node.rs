//! Tree document nodes and the flat position scheme.
//!
//! A document is an ordered tree of [`Node`]s. Element nodes carry a type
//! name (`kind`), an ordered attribute map, and children; text leaves carry
//! a run of characters.
//!
//! # Positions
//!
//! Every node occupies a contiguous span of integer positions:
//!
//! - a text leaf spans one position per character,
//! - an element spans an opening token, its content, and a closing token,
//!   so its size is `2 + content`.
//!
//! The root element is the exception: its tokens are not addressable, so
//! document positions run over `0..root.content_size()`.
//!
//! ```text
//! <doc> <p> H e l l o </p> <p> </p> </doc>
//!       0   1 2 3 4 5 6    7   8    (content size 9)
//! ```
//!
//! Positions *between* siblings are child boundaries; node insertion and
//! removal address those, while text edits address character spans inside
//! a single text run.

use indexmap::IndexMap;
use thiserror::Error;

use crate::Tendril;

pub type Result<T> = std::result::Result<T, NodeError>;

/// Ordered attribute map. Keys are unique; insertion order is preserved so
/// rendered markup stays stable.
pub type Attrs = IndexMap<Tendril, Tendril>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NodeError {
  #[error("range {from}..{to} is out of bounds for content size {size}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    size: usize,
  },
  #[error("range {from}..{to} does not address a single text run")]
  NoTextRange { from: usize, to: usize },
  #[error("no child boundary at position {pos}")]
  NoBoundaryAt { pos: usize },
  #[error("no element node starts at position {pos}")]
  NoNodeAt { pos: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element {
    kind:     Tendril,
    attrs:    Attrs,
    children: Vec<Node>,
  },
  Text(Tendril),
}

impl Node {
  pub fn element(kind: impl Into<Tendril>) -> Self {
    Node::Element {
      kind:     kind.into(),
      attrs:    Attrs::new(),
      children: Vec::new(),
    }
  }

  pub fn element_with(kind: impl Into<Tendril>, children: Vec<Node>) -> Self {
    Node::Element {
      kind: kind.into(),
      attrs: Attrs::new(),
      children,
    }
  }

  pub fn text(text: impl Into<Tendril>) -> Self {
    Node::Text(text.into())
  }

  /// Builder-style attribute setter, mainly for constructing fixtures.
  #[must_use]
  pub fn with_attr(mut self, name: impl Into<Tendril>, value: impl Into<Tendril>) -> Self {
    self.set_attr(&name.into(), Some(&value.into()));
    self
  }

  #[inline]
  pub fn is_text(&self) -> bool {
    matches!(self, Node::Text(_))
  }

  #[inline]
  pub fn is_element(&self) -> bool {
    matches!(self, Node::Element { .. })
  }

  /// Type name for elements, `None` for text leaves.
  pub fn kind(&self) -> Option<&str> {
    match self {
      Node::Element { kind, .. } => Some(kind),
      Node::Text(_) => None,
    }
  }

  pub fn children(&self) -> &[Node] {
    match self {
      Node::Element { children, .. } => children,
      Node::Text(_) => &[],
    }
  }

  pub fn attr(&self, name: &str) -> Option<&str> {
    match self {
      Node::Element { attrs, .. } => attrs.get(name).map(Tendril::as_str),
      Node::Text(_) => None,
    }
  }

  /// Sets attribute `name`, removing it when `value` is `None`. Returns the
  /// previous value. No-op on text leaves.
  pub fn set_attr(&mut self, name: &str, value: Option<&str>) -> Option<Tendril> {
    let Node::Element { attrs, .. } = self else {
      return None;
    };
    match value {
      Some(value) => attrs.insert(Tendril::from(name), Tendril::from(value)),
      None => attrs.shift_remove(name),
    }
  }

  /// Number of positions this node spans in its parent.
  pub fn size(&self) -> usize {
    match self {
      Node::Element { .. } => 2 + self.content_size(),
      Node::Text(text) => text.chars().count(),
    }
  }

  /// Number of positions spanned by the children. Zero for text leaves.
  pub fn content_size(&self) -> usize {
    self.children().iter().map(Node::size).sum()
  }

  /// Concatenation of all descendant text runs.
  pub fn text_content(&self) -> Tendril {
    fn walk(node: &Node, out: &mut Tendril) {
      match node {
        Node::Text(text) => out.push_str(text),
        Node::Element { children, .. } => {
          for child in children {
            walk(child, out);
          }
        },
      }
    }

    let mut out = Tendril::new();
    walk(self, &mut out);
    out
  }

  /// Visits every descendant element whose span intersects `from..to`,
  /// together with the position of its opening token. Parents are visited
  /// before their children, in document order.
  pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
  where
    F: FnMut(&Node, usize),
  {
    self.nodes_between_inner(0, from, to, f)
  }

  fn nodes_between_inner<F>(&self, base: usize, from: usize, to: usize, f: &mut F)
  where
    F: FnMut(&Node, usize),
  {
    let mut pos = base;
    for child in self.children() {
      let end = pos + child.size();
      if pos < to && end > from && child.is_element() {
        f(child, pos);
        child.nodes_between_inner(pos + 1, from, to, f);
      }
      pos = end;
    }
  }

  /// The element whose opening token sits at `pos`, if any.
  pub fn node_at(&self, pos: usize) -> Option<&Node> {
    self.node_at_inner(0, pos)
  }

  fn node_at_inner(&self, base: usize, pos: usize) -> Option<&Node> {
    let mut p = base;
    for child in self.children() {
      let end = p + child.size();
      if child.is_element() {
        if p == pos {
          return Some(child);
        }
        if pos > p && pos < end {
          return child.node_at_inner(p + 1, pos);
        }
      }
      p = end;
    }
    None
  }

  /// Sets attribute `name` on the element starting at `pos`. Outer `None`
  /// means no element starts there; the inner value is the previous one.
  pub fn set_attr_at(
    &mut self,
    pos: usize,
    name: &str,
    value: Option<&str>,
  ) -> Option<Option<Tendril>> {
    let Node::Element { children, .. } = self else {
      return None;
    };
    let mut p = 0;
    for child in children {
      let end = p + child.size();
      if child.is_element() {
        if p == pos {
          return Some(child.set_attr(name, value));
        }
        if pos > p && pos < end {
          return child.set_attr_at(pos - p - 1, name, value);
        }
      }
      p = end;
    }
    None
  }

  /// Replaces the characters in `from..to` with `text` and returns the
  /// replaced characters.
  ///
  /// The range must lie within a single text run; a pure insertion at a
  /// child boundary creates a fresh run. A run left empty is dropped from
  /// the tree so empty elements stay childless.
  pub fn replace_text(&mut self, from: usize, to: usize, text: &str) -> Result<Tendril> {
    let size = self.content_size();
    if from > to || to > size {
      return Err(NodeError::RangeOutOfBounds { from, to, size });
    }
    self
      .replace_text_inner(from, to, text)
      .ok_or(NodeError::NoTextRange { from, to })
  }

  fn replace_text_inner(&mut self, from: usize, to: usize, text: &str) -> Option<Tendril> {
    let Node::Element { children, .. } = self else {
      return None;
    };

    let mut pos = 0;
    for i in 0..children.len() {
      let end = pos + children[i].size();
      match &mut children[i] {
        Node::Text(run) => {
          if from >= pos && to <= end {
            let start_b = char_to_byte(run, from - pos);
            let end_b = char_to_byte(run, to - pos);
            let removed = Tendril::from(&run[start_b..end_b]);
            run.replace_range(start_b..end_b, text);
            let now_empty = run.is_empty();
            if now_empty {
              children.remove(i);
            }
            return Some(removed);
          }
        },
        child @ Node::Element { .. } => {
          if from > pos && to < end {
            return child.replace_text_inner(from - pos - 1, to - pos - 1, text);
          }
        },
      }
      pos = end;
    }

    // No run covers the range: an insertion at a child boundary creates one.
    if from == to && !text.is_empty() {
      let mut pos = 0;
      for i in 0..children.len() {
        if pos == from {
          children.insert(i, Node::text(text));
          return Some(Tendril::new());
        }
        pos += children[i].size();
      }
      if pos == from {
        children.push(Node::text(text));
        return Some(Tendril::new());
      }
    }

    None
  }

  /// Inserts `node` at the child boundary `pos`.
  pub fn insert_node_at(&mut self, pos: usize, node: Node) -> Result<()> {
    if self.insert_node_inner(pos, node) {
      Ok(())
    } else {
      Err(NodeError::NoBoundaryAt { pos })
    }
  }

  fn insert_node_inner(&mut self, pos: usize, node: Node) -> bool {
    let Node::Element { children, .. } = self else {
      return false;
    };
    let mut p = 0;
    for i in 0..children.len() {
      if p == pos {
        children.insert(i, node);
        return true;
      }
      let end = p + children[i].size();
      if pos > p && pos < end && children[i].is_element() {
        return children[i].insert_node_inner(pos - p - 1, node);
      }
      p = end;
    }
    if p == pos {
      children.push(node);
      return true;
    }
    false
  }

  /// Removes and returns the element whose span starts at `pos`.
  pub fn remove_node_at(&mut self, pos: usize) -> Result<Node> {
    self.remove_node_inner(pos).ok_or(NodeError::NoNodeAt { pos })
  }

  fn remove_node_inner(&mut self, pos: usize) -> Option<Node> {
    let Node::Element { children, .. } = self else {
      return None;
    };
    let mut p = 0;
    for i in 0..children.len() {
      let end = p + children[i].size();
      if children[i].is_element() {
        if p == pos {
          return Some(children.remove(i));
        }
        if pos > p && pos < end {
          return children[i].remove_node_inner(pos - p - 1);
        }
      }
      p = end;
    }
    None
  }
}

fn char_to_byte(s: &str, idx: usize) -> usize {
  s.char_indices().nth(idx).map(|(b, _)| b).unwrap_or(s.len())
}
