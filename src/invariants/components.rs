//! Checks on ship components: module ambiguity and weapon ammo order.
//!
//! Configurations resolve ambiguous component slots by intersecting the
//! candidates of every selected module, and silently drop a slot that does not
//! narrow to one. The module check proves, per ship, that some other module line
//! can always remedy the ambiguity, so that dropping never happens on real data.

use crate::corpus::Corpus;
use crate::error::InvariantError;
use crate::invariants::{InvariantOptions, verdict};
use crate::upgrade::{Module, modules_from_upgrade_info};

use log::debug;
use serde_json::Value;
use std::collections::BTreeSet;

const MODULES_INVARIANT: &str = "assert_module_components_resolve_unambiguously";
const AMMO_INVARIANT: &str = "assert_weapon_ammos_are_ordered";

/// `(module key, slot)` pairs whose candidates no combination of other module
/// lines narrows to exactly one.
///
/// Each problem's candidates are intersected with the definitions of the slot in
/// other modules, in source order. Every module line, the problem's own line
/// included, contributes at most once.
pub fn unresolvable_slots(modules: &[Module]) -> Vec<(String, String)> {
    let mut unresolvable = Vec::new();
    for problem in modules {
        for (slot, candidates) in &problem.components {
            if candidates.len() <= 1 {
                continue;
            }
            let remaining = remedy(problem, slot, candidates, modules);
            debug!(
                "{}.{}: {:?} narrowed to {:?}",
                problem.key, slot, candidates, remaining
            );
            if remaining.len() != 1 {
                unresolvable.push((problem.key.clone(), slot.clone()));
            }
        }
    }
    unresolvable
}

fn remedy(problem: &Module, slot: &str, candidates: &[String], modules: &[Module]) -> Vec<String> {
    let mut remaining = candidates.to_vec();
    let mut contributed: BTreeSet<&str> = BTreeSet::from([problem.uc_type.as_str()]);
    for module in modules {
        if remaining.len() == 1 {
            break;
        }
        if contributed.contains(module.uc_type.as_str()) {
            continue;
        }
        if let Some(definition) = module.components.get(slot) {
            remaining.retain(|c| definition.contains(c));
            contributed.insert(module.uc_type.as_str());
        }
    }
    remaining
}

pub fn assert_module_components_resolve_unambiguously(
    corpus: &Corpus,
    options: &InvariantOptions,
) -> Result<(), InvariantError> {
    let mut counterexamples = Vec::new();
    for (key, ship) in corpus.ships() {
        let name = ship.get("name").and_then(Value::as_str).unwrap_or(key);
        if options.ignore.contains(name) {
            debug!("skipping module check for {}", name);
            continue;
        }
        let Some(info) = ship.get("ShipUpgradeInfo") else {
            continue;
        };
        let modules = match modules_from_upgrade_info(info) {
            Ok(modules) => modules,
            Err(e) => {
                counterexamples.push(format!("{}.ShipUpgradeInfo ({})", name, e));
                continue;
            }
        };
        if modules
            .iter()
            .all(|m| m.components.values().all(|c| c.len() <= 1))
        {
            continue;
        }
        counterexamples.extend(
            unresolvable_slots(&modules)
                .into_iter()
                .map(|(module, slot)| format!("{}.ShipUpgradeInfo.{}.{}", name, module, slot)),
        );
    }
    verdict(MODULES_INVARIANT, counterexamples)
}

/// Within one weapon component, every mount lists the same ammo in the same order.
pub fn assert_weapon_ammos_are_ordered(
    corpus: &Corpus,
    _: &InvariantOptions,
) -> Result<(), InvariantError> {
    let mut counterexamples = Vec::new();
    for (key, ship) in corpus.ships() {
        let name = ship.get("name").and_then(Value::as_str).unwrap_or(key);
        let Some(components) = ship.as_object() else {
            continue;
        };
        for (component_key, component) in components {
            let Some(children) = component.as_object() else {
                continue;
            };
            let mut ammo_lists = children
                .iter()
                .filter(|(child, _)| child.starts_with("HP_"))
                .filter_map(|(_, mount)| mount.get("ammoList"));
            let Some(first) = ammo_lists.next() else {
                continue;
            };
            if ammo_lists.any(|other| other != first) {
                counterexamples.push(format!("{}.{}", name, component_key));
            }
        }
    }
    verdict(AMMO_INVARIANT, counterexamples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn module(key: &str, uc_type: &str, slot: &str, candidates: &[&str]) -> Module {
        Module {
            key: key.to_string(),
            uc_type: uc_type.to_string(),
            prev: String::new(),
            components: BTreeMap::from([(
                slot.to_string(),
                candidates.iter().map(|c| c.to_string()).collect(),
            )]),
        }
    }

    #[test]
    fn unambiguous_modules_have_no_problems() {
        let modules = vec![module("A_Hull", "_Hull", "hull", &["A_Hull"])];
        assert!(unresolvable_slots(&modules).is_empty());
    }

    #[test]
    fn other_lines_remedy_ambiguity() {
        let modules = vec![
            module("A_Hull", "_Hull", "artillery", &["AB1", "AB2", "AB3"]),
            module("AB2_Artillery", "_Artillery", "artillery", &["AB2", "AB3"]),
            module("SUO_STOCK", "_Suo", "artillery", &["AB1", "AB3"]),
        ];
        assert!(unresolvable_slots(&modules).is_empty());
    }

    #[test]
    fn a_line_contributes_once() {
        let modules = vec![
            module("A_Hull", "_Hull", "artillery", &["AB1", "AB2", "AB3"]),
            module("AB1_Artillery", "_Artillery", "artillery", &["AB1", "AB3"]),
            module("AB2_Artillery", "_Artillery", "artillery", &["AB2", "AB3"]),
        ];
        assert_eq!(
            unresolvable_slots(&modules),
            vec![
                ("A_Hull".to_string(), "artillery".to_string()),
                ("AB1_Artillery".to_string(), "artillery".to_string()),
                ("AB2_Artillery".to_string(), "artillery".to_string()),
            ]
        );
    }

    #[test]
    fn disjoint_definitions_are_unresolvable() {
        let modules = vec![
            module("A_Hull", "_Hull", "torpedoes", &["T1", "T2"]),
            module("T3_Torpedoes", "_Torpedoes", "torpedoes", &["T3"]),
        ];
        assert_eq!(
            unresolvable_slots(&modules),
            vec![("A_Hull".to_string(), "torpedoes".to_string())]
        );
    }
}
