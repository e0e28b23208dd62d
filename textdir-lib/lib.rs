use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod attr;
pub mod changes;
pub mod commands;
pub mod config;
pub mod document;
pub mod history;
pub mod node;
pub mod reconcile;
pub mod selection;
pub mod transaction;

pub type Tendril = SmartString<LazyCompact>;
