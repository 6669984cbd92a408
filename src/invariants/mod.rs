//! Corpus-wide checks run after every data update.
//!
//! Each check returns the full list of offending objects rather than stopping at
//! the first one. `assert_invariants` runs all of them and reports every failure
//! at once.

pub mod components;

pub use components::{
    assert_module_components_resolve_unambiguously, assert_weapon_ammos_are_ordered,
    unresolvable_slots,
};

use crate::corpus::Corpus;
use crate::error::{InvariantError, InvariantViolations};

use log::{debug, info};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Instant;

const INDEX_RE: &str = r"^P[A-Z]{2,4}[0-9]{3}$";
const NAME_RE: &str = r"^P[A-Z]{2,4}[0-9]{3}_[A-Za-z0-9_]+$";

#[derive(Debug, Clone, Default)]
pub struct InvariantOptions {
    /// Ship names whose ambiguous modules are known and accepted.
    pub ignore: BTreeSet<String>,
}

impl InvariantOptions {
    pub fn ignoring<I, S>(ships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InvariantOptions {
            ignore: ships.into_iter().map(Into::into).collect(),
        }
    }
}

pub type Check = fn(&Corpus, &InvariantOptions) -> Result<(), InvariantError>;

/// Every check, in the order they run.
pub const CHECKS: &[(&str, Check)] = &[
    ("assert_have_ids", assert_have_ids),
    ("assert_have_indices", assert_have_indices),
    ("assert_have_names", assert_have_names),
    ("assert_no_labels", assert_no_labels),
    (
        "assert_module_components_resolve_unambiguously",
        assert_module_components_resolve_unambiguously,
    ),
    (
        "assert_weapon_ammos_are_ordered",
        assert_weapon_ammos_are_ordered,
    ),
];

pub fn assert_invariants(
    corpus: &Corpus,
    options: &InvariantOptions,
) -> Result<(), InvariantViolations> {
    let start = Instant::now();
    let mut errors = Vec::new();
    for (name, check) in CHECKS {
        match check(corpus, options) {
            Ok(()) => debug!("invariant {} holds", name),
            Err(e) => errors.push(e),
        }
    }
    info!(
        "checked {} invariants over {} objects in {}ms, {} violated",
        CHECKS.len(),
        corpus.len(),
        start.elapsed().as_millis(),
        errors.len()
    );
    if errors.is_empty() {
        Ok(())
    } else {
        Err(InvariantViolations { errors })
    }
}

/// Keys of every object failing `holds`, as one error for `invariant`.
pub(crate) fn check_all(
    corpus: &Corpus,
    invariant: &str,
    holds: impl Fn(&Value) -> bool,
) -> Result<(), InvariantError> {
    verdict(
        invariant,
        corpus
            .iter()
            .filter(|&(_, object)| !holds(object))
            .map(|(key, _)| key.to_string())
            .collect(),
    )
}

pub(crate) fn verdict(invariant: &str, counterexamples: Vec<String>) -> Result<(), InvariantError> {
    if counterexamples.is_empty() {
        Ok(())
    } else {
        Err(InvariantError::new(invariant, counterexamples))
    }
}

fn pattern(invariant: &str, re: &str) -> Result<Regex, InvariantError> {
    Regex::new(re).map_err(|e| InvariantError::new(invariant, vec![e.to_string()]))
}

pub fn assert_have_ids(corpus: &Corpus, _: &InvariantOptions) -> Result<(), InvariantError> {
    check_all(corpus, "assert_have_ids", |object| {
        object.get("id").is_some_and(Value::is_number)
    })
}

pub fn assert_have_indices(corpus: &Corpus, _: &InvariantOptions) -> Result<(), InvariantError> {
    const INVARIANT: &str = "assert_have_indices";
    let re = pattern(INVARIANT, INDEX_RE)?;
    check_all(corpus, INVARIANT, |object| {
        object
            .get("index")
            .and_then(Value::as_str)
            .is_some_and(|index| re.is_match(index))
    })
}

pub fn assert_have_names(corpus: &Corpus, _: &InvariantOptions) -> Result<(), InvariantError> {
    const INVARIANT: &str = "assert_have_names";
    let re = pattern(INVARIANT, NAME_RE)?;
    check_all(corpus, INVARIANT, |object| {
        object
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| re.is_match(name))
    })
}

/// Labels are attached at load time; raw data must not carry one.
pub fn assert_no_labels(corpus: &Corpus, _: &InvariantOptions) -> Result<(), InvariantError> {
    check_all(corpus, "assert_no_labels", |object| object.get("label").is_none())
}
