//! Benchmarks for incremental reconciliation.
//!
//! Run with: `cargo bench -p textdir-lib --bench reconcile`
//!
//! The interesting curve is document size: reconciliation cost should track
//! the size of the edit, not the size of the document.

use divan::Bencher;
use textdir_lib::{
  config::Config,
  document::Document,
  node::Node,
  reconcile::DirectionEngine,
  transaction::Transaction,
};

fn main() {
  divan::main();
}

fn document(paragraphs: usize) -> Document {
  let children = (0..paragraphs)
    .map(|i| {
      let text = if i % 2 == 0 {
        "The quick brown fox jumps over the lazy dog"
      } else {
        "דג סקרן שט בים מאוכזב ולפתע מצא חברה"
      };
      Node::element_with("paragraph", vec![Node::text(text)])
    })
    .collect();
  Document::new(Node::element_with("doc", children))
}

#[divan::bench(args = [10, 100, 1000])]
fn single_edit(bencher: Bencher, paragraphs: usize) {
  let engine = DirectionEngine::new(Config::with_types(["paragraph"]));
  let doc = document(paragraphs);

  bencher
    .with_inputs(|| doc.clone())
    .bench_local_values(|mut doc| {
      let mut tx = Transaction::new().replace_text(1, 1, "x");
      engine.apply(&mut doc, &mut tx).unwrap();
      doc
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn edit_at_document_end(bencher: Bencher, paragraphs: usize) {
  let engine = DirectionEngine::new(Config::with_types(["paragraph"]));
  let doc = document(paragraphs);
  let pos = doc.size() - 1;

  bencher
    .with_inputs(|| doc.clone())
    .bench_local_values(|mut doc| {
      let mut tx = Transaction::new().replace_text(pos, pos, "x");
      engine.apply(&mut doc, &mut tx).unwrap();
      doc
    });
}
