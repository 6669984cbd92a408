//! Configuration layer: descriptors, component resolution and derived stats.
//!
//! This module owns:
//! - Descriptor (which module of each line to mount)
//! - Configuration (the resolved, mutable component tree of one ship)
//! - the derived stat table read through a configuration

pub mod descriptor;
pub mod resolve;
pub mod stats;

pub use descriptor::{Descriptor, Level, canonical_type};
pub use resolve::{merge_components, resolve};
pub use stats::{STATS, Stat, StatDef, StatSource};

use crate::error::Result;
use crate::tree::{DataTree, GetOptions};

use serde_json::Value;

/// The equipped components of a ship, keyed by slot (`hull`, `engine`, ...).
///
/// Always a deep copy of source data; modifiers mutate it in place.
#[derive(Debug, Default)]
pub struct Configuration {
    tree: DataTree,
    unresolved: Vec<String>,
}

impl Configuration {
    pub fn new(tree: DataTree, unresolved: Vec<String>) -> Self {
        Self { tree, unresolved }
    }

    pub fn tree(&self) -> &DataTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut DataTree {
        &mut self.tree
    }

    /// Resolved component in `slot`, if any.
    pub fn component(&self, slot: &str) -> Option<&Value> {
        self.tree.root().get(slot)
    }

    /// Slots whose candidates did not narrow to exactly one component.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn get(&self, path: &str) -> Result<Value> {
        self.tree.get(path)
    }

    pub fn get_with(&self, path: &str, options: GetOptions) -> Result<Value> {
        self.tree.get_with(path, options)
    }

    pub fn stat(&self, stat: Stat) -> Result<Value> {
        stats::evaluate(&self.tree, stat)
    }

    /// Numeric stat; errors if the stat is missing or not a single number.
    pub fn stat_f64(&self, stat: Stat) -> Result<f64> {
        let value = self.stat(stat)?;
        value.as_f64().ok_or_else(|| crate::error::ShipError::Collation {
            path: stat.name().to_string(),
            reason: format!("expected a number, found {}", value),
        })
    }
}
