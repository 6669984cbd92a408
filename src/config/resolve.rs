//! Turn a descriptor into a configuration.
//!
//! Each selected module lists candidate references per component slot. The first
//! module to mention a slot seeds its candidates; every later one narrows them by
//! intersection. A slot left with exactly one candidate is expanded from the ship
//! object. Empty or still-ambiguous slots stay absent: whether real data ever
//! produces them is checked offline by the corpus invariants.

use crate::config::Configuration;
use crate::config::descriptor::Descriptor;
use crate::error::Result;
use crate::tree::DataTree;
use crate::upgrade::{Module, ModuleLines};

use log::warn;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// slot -> remaining candidate references, first operand's order preserved.
pub fn merge_components(modules: &[&Module]) -> BTreeMap<String, Vec<String>> {
    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for module in modules {
        for (slot, candidates) in &module.components {
            match merged.entry(slot.clone()) {
                Entry::Vacant(e) => {
                    e.insert(candidates.clone());
                }
                Entry::Occupied(mut e) => {
                    e.get_mut().retain(|c| candidates.contains(c));
                }
            }
        }
    }
    merged
}

/// Build a fresh configuration for `ship` from `descriptor`.
///
/// The result is a deep copy; nothing in it aliases the ship's source data.
pub fn resolve(ship: &Value, lines: &ModuleLines, descriptor: &Descriptor) -> Result<Configuration> {
    let selected = descriptor.select(lines)?;
    let merged = merge_components(&selected);

    let mut slots = Map::new();
    let mut unresolved = Vec::new();
    for (slot, candidates) in merged {
        match candidates.as_slice() {
            [reference] => match ship.get(reference) {
                Some(component) => {
                    slots.insert(slot, component.clone());
                }
                None => {
                    warn!("slot {} references {} which the ship does not define", slot, reference);
                    unresolved.push(slot);
                }
            },
            _ => {
                warn!(
                    "slot {} did not resolve to a single component (candidates: {:?})",
                    slot, candidates
                );
                unresolved.push(slot);
            }
        }
    }

    Ok(Configuration::new(
        DataTree::new(Value::Object(slots)),
        unresolved,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn module(uc_type: &str, components: &[(&str, Vec<&str>)]) -> Module {
        Module {
            key: format!("{}_M", uc_type),
            uc_type: uc_type.to_string(),
            prev: String::new(),
            components: components
                .iter()
                .map(|(slot, refs)| {
                    (slot.to_string(), refs.iter().map(|r| r.to_string()).collect())
                })
                .collect(),
        }
    }

    #[test]
    fn intersection_narrows_ambiguous_slots() {
        let hull = module("_Hull", &[("hull", vec!["A_Hull"]), ("artillery", vec!["AB2", "AB1"])]);
        let art = module("_Artillery", &[("artillery", vec!["AB1", "AB2", "AB3"])]);
        let suo = module("_Suo", &[("artillery", vec!["AB1", "AB3"])]);

        let merged = merge_components(&[&hull, &art]);
        assert_eq!(merged["artillery"], vec!["AB2", "AB1"]);

        let merged = merge_components(&[&hull, &art, &suo]);
        assert_eq!(merged["artillery"], vec!["AB1"]);
        assert_eq!(merged["hull"], vec!["A_Hull"]);
    }

    #[test]
    fn conflicting_definitions_leave_the_slot_empty() {
        let a = module("_Hull", &[("torpedoes", vec!["T1"])]);
        let b = module("_Torpedoes", &[("torpedoes", vec!["T2"])]);
        assert!(merge_components(&[&a, &b])["torpedoes"].is_empty());
    }

    #[test]
    fn resolve_expands_and_copies() {
        let ship = json!({
            "A_Hull": { "health": 100 },
            "ShipUpgradeInfo": {}
        });
        let mut lines = ModuleLines::new();
        lines.insert(
            "_Hull".into(),
            vec![module(
                "_Hull",
                &[("hull", vec!["A_Hull"]), ("torpedoes", vec!["T1", "T2"])],
            )],
        );
        let descriptor = Descriptor::parse("stock").unwrap();

        let mut config = resolve(&ship, &lines, &descriptor).unwrap();
        assert_eq!(config.get("hull.health").unwrap(), json!(100));
        assert_eq!(config.unresolved().to_vec(), vec!["torpedoes".to_string()]);
        assert!(!config.tree().contains_key("torpedoes"));

        config.tree_mut().multiply("hull.health", 2.0).unwrap();
        assert_eq!(ship["A_Hull"]["health"], json!(100));
    }
}
