//! Ship configurations and their derived statistics under stacked, reversible modifiers.

pub mod config;
pub mod corpus;
pub mod error;
pub mod invariants;
pub mod modifier;
pub mod report;
pub mod ship;
pub mod tree;
pub mod upgrade;

pub use config::{Configuration, Descriptor, Stat};
pub use corpus::Corpus;
pub use error::{InvariantError, InvariantViolations, Result, ShipError};
pub use invariants::{InvariantOptions, assert_invariants};
pub use modifier::{Camouflage, Captain, Modernization, Modifier, ModifierSource, ModifierTargets};
pub use ship::{Ship, ShipInfo};
pub use tree::{DataTree, GetOptions};
pub use upgrade::{Module, ModuleLines};
