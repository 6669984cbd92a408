//! Upgrade layer: raw module definitions and the module lines built from them.
//!
//! This module owns:
//! - Module (definition + its ShipUpgradeInfo key)
//! - ModuleLines (validated per-ucType ordering)

pub mod lines;
pub mod module;

pub use lines::{ModuleLines, build_module_lines};
pub use module::{Module, RawModule, modules_from_upgrade_info};
