//! Captains (`typeinfo.type == "Crew"`) and their skills.

use crate::error::{Result, ShipError};
use crate::modifier::targets::ModifierTargets;
use crate::modifier::{Modifier, ModifierSource, raw_effects, typeinfo};
use crate::ship::ShipInfo;

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const CREW: &str = "Crew";

#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub name: String,
    /// Ship species this skill works on; empty means all.
    pub species: Vec<String>,
    effects: Map<String, Value>,
}

impl Skill {
    fn from_raw(name: &str, raw: &Value) -> Skill {
        let species = raw
            .get("species")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Skill {
            name: name.to_string(),
            species,
            effects: raw_effects(raw),
        }
    }

    pub fn eligible(&self, ship: &ShipInfo) -> bool {
        self.species.is_empty() || self.species.iter().any(|s| *s == ship.species)
    }

    pub fn modifiers(&self, captain: &str, ship: &ShipInfo, targets: &ModifierTargets) -> Vec<Modifier> {
        let source = ModifierSource::Skill {
            captain: captain.to_string(),
            skill: self.name.clone(),
        };
        Modifier::from_effects(&self.effects, &ship.species, targets, &source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Captain {
    name: String,
    skills: BTreeMap<String, Skill>,
    learned: BTreeSet<String>,
}

impl Captain {
    pub fn from_object(object: &Value) -> Result<Captain> {
        match typeinfo(object).0 {
            Some(CREW) => {}
            found => {
                return Err(ShipError::TypeArgument {
                    expected: "Captain",
                    found: found.unwrap_or("untyped object").to_string(),
                });
            }
        }
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ShipError::Data("captain without a name".to_string()))?;
        let skills = object
            .get("Skills")
            .and_then(Value::as_object)
            .map(|skills| {
                skills
                    .iter()
                    .filter(|(_, raw)| raw.is_object())
                    .map(|(key, raw)| (key.clone(), Skill::from_raw(key, raw)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Captain {
            name: name.to_string(),
            skills,
            learned: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    /// Learn a skill by name. Returns false if the captain has no such skill.
    pub fn learn(&mut self, skill: &str) -> bool {
        if !self.skills.contains_key(skill) {
            return false;
        }
        self.learned.insert(skill.to_string());
        true
    }

    pub fn learned(&self) -> impl Iterator<Item = &Skill> {
        self.learned.iter().filter_map(|name| self.skills.get(name))
    }

    /// Learned skills that work on `ship`.
    pub fn learned_for_ship<'a>(&'a self, ship: &'a ShipInfo) -> impl Iterator<Item = &'a Skill> {
        self.learned().filter(move |skill| skill.eligible(ship))
    }

    pub fn modifiers(&self, ship: &ShipInfo, targets: &ModifierTargets) -> Vec<Modifier> {
        self.learned_for_ship(ship)
            .flat_map(|skill| skill.modifiers(&self.name, ship, targets))
            .collect()
    }
}
