//! The game object corpus: every raw object keyed by its reference name.

use crate::error::{Result, ShipError};
use crate::modifier::{Camouflage, Captain, Modernization, ModifierTargets, typeinfo};
use crate::ship::Ship;

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only; ships built from it share its objects.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    objects: BTreeMap<String, Arc<Value>>,
}

impl Corpus {
    pub fn new(objects: BTreeMap<String, Value>) -> Corpus {
        Corpus {
            objects: objects.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }

    pub fn from_value(value: Value) -> Result<Corpus> {
        let Value::Object(objects) = value else {
            return Err(ShipError::Data("corpus must be a JSON object".to_string()));
        };
        Ok(Corpus::new(objects.into_iter().collect()))
    }

    pub fn from_json_str(json: &str) -> Result<Corpus> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ShipError::Data(format!("invalid corpus: {}", e)))?;
        Corpus::from_value(value)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Corpus> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ShipError::Data(format!("cannot read {}: {}", path.display(), e)))?;
        Corpus::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.objects.get(key).map(|v| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Objects whose `typeinfo.type` is `Ship`.
    pub fn ships(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter().filter(|(_, v)| typeinfo(v).0 == Some("Ship"))
    }

    fn require(&self, key: &str) -> Result<&Arc<Value>> {
        self.objects
            .get(key)
            .ok_or_else(|| ShipError::NotFound(key.to_string()))
    }

    pub fn ship(&self, key: &str, descriptor: &str, targets: Arc<ModifierTargets>) -> Result<Ship> {
        Ship::with_descriptor(Arc::clone(self.require(key)?), descriptor, targets)
    }

    pub fn captain(&self, key: &str) -> Result<Captain> {
        Captain::from_object(self.require(key)?)
    }

    pub fn modernization(&self, key: &str) -> Result<Modernization> {
        Modernization::from_object(self.require(key)?)
    }

    pub fn camouflage(&self, key: &str) -> Result<Camouflage> {
        Camouflage::from_object(self.require(key)?)
    }
}
