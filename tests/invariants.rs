use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use shipfit::{Corpus, InvariantOptions, InvariantViolations, assert_invariants};

const SHIP: &str = "PAAA001_Battleship";

fn data() -> Value {
    serde_json::from_str(include_str!("fixtures/invariants.json")).unwrap()
}

fn check(data: Value) -> Result<(), InvariantViolations> {
    check_with(data, &InvariantOptions::default())
}

fn check_with(data: Value, options: &InvariantOptions) -> Result<(), InvariantViolations> {
    assert_invariants(&Corpus::from_value(data).unwrap(), options)
}

fn counterexamples(err: &InvariantViolations, invariant: &str) -> Vec<String> {
    err.errors
        .iter()
        .find(|e| e.invariant == invariant)
        .map(|e| e.counterexamples.clone())
        .unwrap_or_default()
}

fn set_components(data: &mut Value, module: &str, slot: &str, refs: Value) {
    data[SHIP]["ShipUpgradeInfo"][module]["components"][slot] = refs;
}

#[test]
fn fixture_satisfies_every_invariant() {
    assert_eq!(check(data()), Ok(()));
}

#[test]
fn unremedied_ambiguity_is_reported() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "torpedoes",
        json!(["AB1_Torpedoes", "AB2_Torpedoes"]),
    );

    let err = check(data).unwrap_err();
    assert_eq!(
        err.invariants(),
        vec!["assert_module_components_resolve_unambiguously"]
    );
    assert_eq!(
        counterexamples(&err, "assert_module_components_resolve_unambiguously"),
        vec!["PAAA001_Battleship.ShipUpgradeInfo.A_Hull.torpedoes".to_string()]
    );
}

#[test]
fn ambiguity_remedied_by_a_single_other_module() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "artillery",
        json!(["AB1_Artillery", "AB2_Artillery"]),
    );
    assert_eq!(check(data), Ok(()));
}

#[test]
fn ambiguity_remedied_by_several_other_modules() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "artillery",
        json!(["AB1_Artillery", "AB2_Artillery", "AB3_Artillery"]),
    );
    set_components(
        &mut data,
        "AB2_Artillery",
        "artillery",
        json!(["AB2_Artillery", "AB3_Artillery"]),
    );
    set_components(
        &mut data,
        "SUO_STOCK",
        "artillery",
        json!(["AB1_Artillery", "AB3_Artillery"]),
    );
    if let Some(info) = data[SHIP]["ShipUpgradeInfo"].as_object_mut() {
        info.remove("AB1_Artillery");
    }
    assert_eq!(check(data), Ok(()));
}

#[test]
fn modules_of_one_type_cannot_remedy_together() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "artillery",
        json!(["AB1_Artillery", "AB2_Artillery", "AB3_Artillery"]),
    );
    set_components(
        &mut data,
        "AB1_Artillery",
        "artillery",
        json!(["AB1_Artillery", "AB3_Artillery"]),
    );
    set_components(
        &mut data,
        "AB2_Artillery",
        "artillery",
        json!(["AB2_Artillery", "AB3_Artillery"]),
    );

    let err = check(data).unwrap_err();
    assert!(
        counterexamples(&err, "assert_module_components_resolve_unambiguously")
            .contains(&"PAAA001_Battleship.ShipUpgradeInfo.A_Hull.artillery".to_string())
    );
}

#[test]
fn ignored_ships_are_skipped() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "torpedoes",
        json!(["AB1_Torpedoes", "AB2_Torpedoes"]),
    );
    assert_eq!(
        check_with(data, &InvariantOptions::ignoring([SHIP])),
        Ok(())
    );
}

#[test]
fn ammo_order_differs_between_mounts() {
    let mut data = data();
    data[SHIP]["AB1_Artillery"]["HP_AGM_2"]["ammoList"] = json!(["PAPA002_HE", "PAPA001_AP"]);

    let err = check(data).unwrap_err();
    assert_eq!(err.invariants(), vec!["assert_weapon_ammos_are_ordered"]);
    assert_eq!(
        counterexamples(&err, "assert_weapon_ammos_are_ordered"),
        vec!["PAAA001_Battleship.AB1_Artillery".to_string()]
    );
}

#[test]
fn labels_and_reference_codes() {
    let mut data = data();
    data["PCM001_Test_Modernization"]["label"] = json!("Test Modernization");
    data["PCM001_Test_Modernization"]["index"] = json!("PCM01");

    let err = check(data).unwrap_err();
    assert_eq!(
        err.invariants(),
        vec!["assert_have_indices", "assert_no_labels"]
    );
    assert_eq!(
        counterexamples(&err, "assert_no_labels"),
        vec!["PCM001_Test_Modernization".to_string()]
    );
}

#[test]
fn every_failure_is_reported_together() {
    let mut data = data();
    set_components(
        &mut data,
        "A_Hull",
        "torpedoes",
        json!(["AB1_Torpedoes", "AB2_Torpedoes"]),
    );
    data[SHIP]["AB2_Artillery"]["HP_AGM_1"]["ammoList"] = json!(["PAPA004_HE", "PAPA003_AP"]);
    if let Some(object) = data["PCM001_Test_Modernization"].as_object_mut() {
        object.remove("id");
    }

    let err = check(data).unwrap_err();
    assert_eq!(
        err.invariants(),
        vec![
            "assert_have_ids",
            "assert_module_components_resolve_unambiguously",
            "assert_weapon_ammos_are_ordered"
        ]
    );
    assert!(err.to_string().starts_with("3 corpus invariant(s) violated"));
}
