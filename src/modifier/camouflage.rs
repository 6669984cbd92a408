//! Camouflages: expendable ones fit every ship, permanent ones only the ships listing them.

use crate::error::{Result, ShipError};
use crate::modifier::targets::ModifierTargets;
use crate::modifier::{Modifier, ModifierSource, raw_effects, typeinfo};
use crate::ship::ShipInfo;

use serde::Serialize;
use serde_json::{Map, Value};

const EXTERIOR: &str = "Exterior";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CamouflageKind {
    Expendable,
    Permanent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camouflage {
    name: String,
    kind: CamouflageKind,
    effects: Map<String, Value>,
}

impl Camouflage {
    pub fn from_object(object: &Value) -> Result<Camouflage> {
        let kind = match typeinfo(object) {
            (Some(EXTERIOR), Some("Camouflage")) => CamouflageKind::Expendable,
            (Some(EXTERIOR), Some("Permoflage")) => CamouflageKind::Permanent,
            (kind, species) => {
                return Err(ShipError::TypeArgument {
                    expected: "Camouflage",
                    found: format!(
                        "{}/{}",
                        kind.unwrap_or("untyped"),
                        species.unwrap_or("none")
                    ),
                });
            }
        };
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ShipError::Data("camouflage without a name".to_string()))?;
        Ok(Camouflage {
            name: name.to_string(),
            kind,
            effects: raw_effects(object),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CamouflageKind {
        self.kind
    }

    pub fn eligible(&self, ship: &ShipInfo) -> bool {
        match self.kind {
            CamouflageKind::Expendable => true,
            CamouflageKind::Permanent => ship.permoflages.contains(&self.name),
        }
    }

    pub fn modifiers(&self, ship: &ShipInfo, targets: &ModifierTargets) -> Vec<Modifier> {
        let source = ModifierSource::Camouflage {
            name: self.name.clone(),
        };
        Modifier::from_effects(&self.effects, &ship.species, targets, &source)
    }
}
