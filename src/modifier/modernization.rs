//! Modernizations (permanent ship upgrades).

use crate::error::{Result, ShipError};
use crate::modifier::targets::ModifierTargets;
use crate::modifier::{Modifier, ModifierSource, typeinfo};
use crate::ship::ShipInfo;

use serde::Deserialize;
use serde_json::{Map, Value};

const MODERNIZATION: &str = "Modernization";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Modernization {
    pub name: String,
    #[serde(default)]
    pub id: Option<u64>,
    /// Upgrade slot, -1 for unassigned.
    #[serde(default)]
    pub slot: Option<i64>,
    #[serde(default, rename = "modifiers")]
    effects: Map<String, Value>,
    #[serde(default)]
    shiplevel: Vec<u32>,
    #[serde(default)]
    shiptype: Vec<String>,
    #[serde(default)]
    nation: Vec<String>,
    #[serde(default)]
    ships: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
}

impl Modernization {
    pub fn from_object(object: &Value) -> Result<Modernization> {
        match typeinfo(object).0 {
            Some(MODERNIZATION) => {}
            found => {
                return Err(ShipError::TypeArgument {
                    expected: "Modernization",
                    found: found.unwrap_or("untyped object").to_string(),
                });
            }
        }
        Modernization::deserialize(object)
            .map_err(|e| ShipError::Data(format!("malformed modernization: {}", e)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit exclusion beats explicit inclusion, which beats the generic filters.
    pub fn eligible(&self, ship: &ShipInfo) -> bool {
        if self.excludes.contains(&ship.name) {
            return false;
        }
        if self.ships.contains(&ship.name) {
            return true;
        }
        (self.shiplevel.is_empty() || self.shiplevel.contains(&ship.tier))
            && (self.shiptype.is_empty() || self.shiptype.contains(&ship.species))
            && (self.nation.is_empty() || self.nation.contains(&ship.nation))
    }

    pub fn modifiers(&self, ship: &ShipInfo, targets: &ModifierTargets) -> Vec<Modifier> {
        let source = ModifierSource::Modernization {
            name: self.name.clone(),
        };
        Modifier::from_effects(&self.effects, &ship.species, targets, &source)
    }
}
