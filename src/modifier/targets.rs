//! Which tree path each raw game effect multiplies, and how its factor is read.
//!
//! Raw effects are keyed by their in-game names (`GMMaxDist`, `visibilityDistCoeff`, ...).
//! Only names present in the table produce modifiers; everything else is ignored.

use crate::error::{Result, ShipError};
use crate::tree::TreePath;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// How a raw effect value turns into a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retriever {
    /// The value is the factor.
    #[default]
    Direct,
    /// The value is an object keyed by ship species; plain numbers apply to every species.
    BySpecies,
}

impl Retriever {
    pub fn retrieve(self, raw: &Value, species: &str) -> Option<f64> {
        match self {
            Retriever::Direct => raw.as_f64(),
            Retriever::BySpecies => match raw {
                Value::Object(by_species) => by_species.get(species).and_then(Value::as_f64),
                other => other.as_f64(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierTarget {
    pub path: String,
    #[serde(default)]
    pub retriever: Retriever,
}

/// Effect name -> target. Injected into every ship; there is no global table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierTargets {
    targets: BTreeMap<String, ModifierTarget>,
}

const BUILTIN: &[(&str, &str, Retriever)] = &[
    ("AAMaxHP", "airDefense.*.maxHP", Retriever::Direct),
    ("ATBAMaxDist", "atba.maxDist", Retriever::Direct),
    ("GMMaxDist", "artillery.maxDist", Retriever::Direct),
    ("GMRotationSpeed", "artillery.HP_*.rotationSpeed.0", Retriever::Direct),
    ("GMShotDelay", "artillery.HP_*.shotDelay", Retriever::Direct),
    ("GTMaxDist", "torpedoes.HP_*.ammoList.*.maxDist", Retriever::Direct),
    ("GTMaxSpeed", "torpedoes.HP_*.ammoList.*.speed", Retriever::Direct),
    ("GTRotationSpeed", "torpedoes.HP_*.rotationSpeed.0", Retriever::Direct),
    ("GTShotDelay", "torpedoes.HP_*.shotDelay", Retriever::Direct),
    ("SGRudderTime", "hull.rudderTime", Retriever::Direct),
    ("speedCoef", "hull.maxSpeed", Retriever::Direct),
    ("visibilityDistCoeff", "hull.visibilityFactor", Retriever::BySpecies),
];

impl Default for ModifierTargets {
    fn default() -> Self {
        let mut targets = ModifierTargets::empty();
        for (name, path, retriever) in BUILTIN {
            targets.insert(*name, *path, *retriever);
        }
        targets
    }
}

impl ModifierTargets {
    pub fn empty() -> Self {
        ModifierTargets {
            targets: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>, retriever: Retriever) {
        self.targets.insert(
            name.into(),
            ModifierTarget {
                path: path.into(),
                retriever,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&ModifierTarget> {
        self.targets.get(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Every target path must parse.
    pub fn validate(&self) -> Result<()> {
        for target in self.targets.values() {
            TreePath::parse(&target.path)?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let targets: ModifierTargets = serde_json::from_str(json)
            .map_err(|e| ShipError::Data(format!("invalid modifier targets: {}", e)))?;
        targets.validate()?;
        Ok(targets)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ShipError::Data(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn retrievers() {
        assert_eq!(Retriever::Direct.retrieve(&json!(1.1), "Cruiser"), Some(1.1));
        assert_eq!(Retriever::Direct.retrieve(&json!("x"), "Cruiser"), None);

        let by_species = json!({ "Cruiser": 0.9, "Destroyer": 0.85 });
        assert_eq!(Retriever::BySpecies.retrieve(&by_species, "Destroyer"), Some(0.85));
        assert_eq!(Retriever::BySpecies.retrieve(&by_species, "Battleship"), None);
        assert_eq!(Retriever::BySpecies.retrieve(&json!(0.97), "Battleship"), Some(0.97));
    }

    #[test]
    fn builtin_table_is_valid() {
        let targets = ModifierTargets::default();
        assert!(!targets.is_empty());
        targets.validate().unwrap();
        assert_eq!(targets.get("GMMaxDist").unwrap().path, "artillery.maxDist");
    }

    #[test]
    fn deserializes_with_default_retriever() {
        let targets = ModifierTargets::from_json_str(
            r#"{
                "healthCoef": { "path": "hull.health" },
                "concealment": { "path": "hull.visibilityFactor", "retriever": "by_species" }
            }"#,
        )
        .unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get("healthCoef").unwrap().retriever, Retriever::Direct);
        assert_eq!(
            targets.get("concealment").unwrap().retriever,
            Retriever::BySpecies
        );
    }

    #[test]
    fn rejects_bad_paths_and_retrievers() {
        assert!(ModifierTargets::from_json_str(r#"{ "x": { "path": "hull..health" } }"#).is_err());
        assert!(
            ModifierTargets::from_json_str(r#"{ "x": { "path": "hull", "retriever": "magic" } }"#)
                .is_err()
        );
    }
}
