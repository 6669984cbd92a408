//! Module definitions as they appear in a ship's `ShipUpgradeInfo`.
//!
//! JSON shape:
//! {
//!   "ShipUpgradeInfo": {
//!     "HULL_STOCK": {
//!       "ucType": "_Hull",
//!       "prev": "",                          // key of the predecessor, "" for a line root
//!       "components": {
//!         "hull": ["A_Hull"],
//!         "artillery": ["AB1_Artillery", "AB2_Artillery"]   // > 1 entry: ambiguous
//!       }
//!     },
//!     "costs": 0,                            // metadata, filtered out
//!     ...
//!   }
//! }

use crate::error::{Result, ShipError};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw module shape as it appears in ShipUpgradeInfo.
#[derive(Debug, Clone, Deserialize)]
pub struct RawModule {
    #[serde(rename = "ucType")]
    pub uc_type: String,

    pub prev: String,

    #[serde(default)]
    pub components: BTreeMap<String, Vec<String>>,
}

/// A module definition paired with the key it was stored under.
///
/// `prev` references of other modules point at `key`, so the key is the module's
/// identity during line building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub key: String,
    pub uc_type: String,
    pub prev: String,
    pub components: BTreeMap<String, Vec<String>>,
}

impl Module {
    pub fn new(key: impl Into<String>, raw: RawModule) -> Self {
        Self {
            key: key.into(),
            uc_type: raw.uc_type,
            prev: raw.prev,
            components: raw.components,
        }
    }

    pub fn is_root(&self) -> bool {
        self.prev.is_empty()
    }
}

fn is_module_definition(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        obj.contains_key("components") && obj.contains_key("prev") && obj.contains_key("ucType")
    })
}

/// Pull every module definition out of a ShipUpgradeInfo object, in source order.
/// Primitives and objects that are not module definitions are skipped.
pub fn modules_from_upgrade_info(info: &Value) -> Result<Vec<Module>> {
    let Some(entries) = info.as_object() else {
        return Err(ShipError::Data(
            "ShipUpgradeInfo is not an object".to_string(),
        ));
    };

    let mut modules = Vec::new();
    for (key, value) in entries {
        if !is_module_definition(value) {
            continue;
        }
        let raw: RawModule = serde_json::from_value(value.clone())
            .map_err(|e| ShipError::Data(format!("malformed module definition {}: {}", key, e)))?;
        modules.push(Module::new(key.clone(), raw));
    }
    Ok(modules)
}
