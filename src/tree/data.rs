//! Wildcard-addressable JSON tree with invertible multiplicative mutation.
//!
//! Every numeric leaf touched by `multiply` is tracked by its JSON pointer: the
//! value it had before the first mutation, plus the factors currently applied to
//! it. The live value is always recomputed as `original * factors / divisors`, so
//! removing a factor with `unmultiply` is exact, whatever else is stacked on the
//! same leaf.

use crate::error::{Result, ShipError};
use crate::tree::path::{Segment, TreePath, matching, pointer_token};

use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Options for `DataTree::get_with`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Collapse matches into one value. Defaults to "path has no wildcard".
    pub collate: Option<bool>,
}

impl GetOptions {
    pub fn collate(collate: bool) -> Self {
        Self {
            collate: Some(collate),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tracked {
    original: Number,
    factors: Vec<f64>,
    divisors: Vec<f64>,
}

impl Tracked {
    fn capture(original: Number) -> Self {
        Self {
            original,
            factors: Vec::new(),
            divisors: Vec::new(),
        }
    }

    fn value(&self) -> Value {
        if self.factors.is_empty() && self.divisors.is_empty() {
            return Value::Number(self.original.clone());
        }
        let base = self.original.as_f64().unwrap_or_default();
        let scaled = self.factors.iter().fold(base, |acc, f| acc * f);
        let scaled = self.divisors.iter().fold(scaled, |acc, d| acc / d);
        Number::from_f64(scaled).map_or(Value::Null, Value::Number)
    }

    /// Drop one application of `factor`. Returns false if it was never applied.
    fn remove_factor(&mut self, factor: f64) -> bool {
        match self
            .factors
            .iter()
            .position(|f| f.to_bits() == factor.to_bits())
        {
            Some(i) => {
                self.factors.remove(i);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct DataTree {
    root: Value,
    tracked: BTreeMap<String, Tracked>,
}

impl DataTree {
    pub fn new(root: Value) -> Self {
        Self {
            root,
            tracked: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// True if the top level of the tree has `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.root.get(key).is_some()
    }

    /// Read with default collation (on unless the path has a wildcard).
    pub fn get(&self, path: &str) -> Result<Value> {
        self.get_with(path, GetOptions::default())
    }

    /// Read the value(s) at `path`.
    ///
    /// Without collation, all matches come back as a JSON array, flattened exactly
    /// one level: values that are themselves arrays stay nested. With collation, all
    /// matches must be deeply equal and the single value is returned.
    pub fn get_with(&self, path: &str, options: GetOptions) -> Result<Value> {
        let path = TreePath::parse(path)?;
        let collate = options.collate.unwrap_or(!path.has_wildcard());
        let values = collect(&self.root, path.segments());

        if !collate {
            return Ok(Value::Array(values.into_iter().cloned().collect()));
        }

        let Some(first) = values.first() else {
            return Err(ShipError::Collation {
                path: path.to_string(),
                reason: "no value matched".to_string(),
            });
        };
        if let Some(other) = values.iter().find(|v| **v != *first) {
            return Err(ShipError::Collation {
                path: path.to_string(),
                reason: format!("expected all values to be equal, found {} and {}", first, other),
            });
        }
        Ok((*first).clone())
    }

    /// Multiply every numeric leaf matching `path` by `factor`.
    /// Returns the number of leaves changed.
    pub fn multiply(&mut self, path: &str, factor: f64) -> Result<usize> {
        check_factor(factor)?;
        let path = TreePath::parse(path)?;
        let pointers = self.numeric_pointers(&path);

        for ptr in &pointers {
            let Some(leaf) = self.root.pointer_mut(ptr) else {
                continue;
            };
            let Value::Number(current) = leaf else {
                continue;
            };
            let tracked = self
                .tracked
                .entry(ptr.clone())
                .or_insert_with(|| Tracked::capture(current.clone()));
            tracked.factors.push(factor);
            *leaf = tracked.value();
        }
        Ok(pointers.len())
    }

    /// Exact inverse of one `multiply(path, factor)` call. Captured originals are
    /// left as they are.
    pub fn unmultiply(&mut self, path: &str, factor: f64) -> Result<usize> {
        check_factor(factor)?;
        let path = TreePath::parse(path)?;
        let pointers = self.numeric_pointers(&path);

        for ptr in &pointers {
            let Some(leaf) = self.root.pointer_mut(ptr) else {
                continue;
            };
            match self.tracked.get_mut(ptr) {
                Some(tracked) => {
                    if !tracked.remove_factor(factor) {
                        tracked.divisors.push(factor);
                    }
                    *leaf = tracked.value();
                }
                None => {
                    // Never multiplied: plain division, nothing to restore later.
                    if let Some(v) = leaf.as_f64().and_then(|v| Number::from_f64(v / factor)) {
                        *leaf = Value::Number(v);
                    }
                }
            }
        }
        Ok(pointers.len())
    }

    /// Restore every tracked leaf to its captured original.
    pub fn clear(&mut self) {
        for (ptr, tracked) in self.tracked.iter_mut() {
            tracked.factors.clear();
            tracked.divisors.clear();
            if let Some(leaf) = self.root.pointer_mut(ptr) {
                *leaf = Value::Number(tracked.original.clone());
            }
        }
    }

    /// Pristine deep copy: all leaves at their originals, nothing tracked.
    pub fn fresh_copy(&self) -> DataTree {
        let mut root = self.root.clone();
        for (ptr, tracked) in &self.tracked {
            if let Some(leaf) = root.pointer_mut(ptr) {
                *leaf = Value::Number(tracked.original.clone());
            }
        }
        DataTree::new(root)
    }

    /// Deep copy of the current values, without original tracking.
    pub fn clone_current(&self) -> DataTree {
        DataTree::new(self.root.clone())
    }

    fn numeric_pointers(&self, path: &TreePath) -> Vec<String> {
        let mut out = Vec::new();
        numeric_pointers(&self.root, path.segments(), String::new(), &mut out);
        out
    }
}

impl From<Value> for DataTree {
    fn from(root: Value) -> Self {
        DataTree::new(root)
    }
}

fn check_factor(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(ShipError::InvalidFactor(factor))
    }
}

fn collect<'a>(node: &'a Value, segments: &[Segment]) -> Vec<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return vec![node];
    };
    matching(node, head)
        .into_iter()
        .flat_map(|(_, child)| collect(child, rest))
        .collect()
}

fn numeric_pointers(node: &Value, segments: &[Segment], prefix: String, out: &mut Vec<String>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    for (key, child) in matching(node, head) {
        let ptr = format!("{}/{}", prefix, pointer_token(&key));
        if rest.is_empty() {
            if child.is_number() {
                out.push(ptr);
            }
        } else {
            numeric_pointers(child, rest, ptr, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree() -> DataTree {
        DataTree::new(json!({
            "engine": { "value": 3.0, "speedCoef": 0.1 },
            "artillery": {
                "maxDist": 15000,
                "HP_AGM_1": { "barrelDiameter": 0.203, "rotationSpeed": [6.0, 6.0], "ammoList": ["AP", "HE"] },
                "HP_AGM_2": { "barrelDiameter": 0.203, "rotationSpeed": [6.0, 6.0], "ammoList": ["AP", "HE"] },
                "HP_AGM_3": { "barrelDiameter": 0.152, "rotationSpeed": [8.0, 8.0], "ammoList": ["HE"] }
            },
            "a": { "x": { "value": 1 }, "y": { "value": 2 } }
        }))
    }

    #[test]
    fn get_plain_path_collates() {
        let t = tree();
        assert_eq!(t.get("engine.value").unwrap(), json!(3.0));
        assert_eq!(t.get("artillery.HP_AGM_1.rotationSpeed.0").unwrap(), json!(6.0));
    }

    #[test]
    fn get_wildcard_returns_flat_sequence() {
        let t = tree();
        assert_eq!(
            t.get("artillery.HP_*.barrelDiameter").unwrap(),
            json!([0.203, 0.203, 0.152])
        );
        // Arrays at the leaf stay nested: flattened one level only.
        assert_eq!(
            t.get("artillery.HP_*.ammoList").unwrap(),
            json!([["AP", "HE"], ["AP", "HE"], ["HE"]])
        );
        assert_eq!(t.get("a.*.value").unwrap(), json!([1, 2]));
    }

    #[test]
    fn get_wildcard_with_collation() {
        let t = tree();
        let opts = GetOptions::collate(true);
        assert_eq!(
            t.get_with("artillery.HP_AGM_*.ammoList", opts).unwrap_err(),
            ShipError::Collation {
                path: "artillery.HP_AGM_*.ammoList".to_string(),
                reason: r#"expected all values to be equal, found ["AP","HE"] and ["HE"]"#
                    .to_string(),
            }
        );

        let mut t = t;
        t.root = json!({ "m": { "a": { "v": [1, 2] }, "b": { "v": [1, 2] } } });
        assert_eq!(t.get_with("m.*.v", opts).unwrap(), json!([1, 2]));
    }

    #[test]
    fn get_missing_path() {
        let t = tree();
        assert_eq!(
            t.get_with("torpedoes.*.speed", GetOptions::default()).unwrap(),
            json!([])
        );
        assert!(matches!(
            t.get("torpedoes.speed"),
            Err(ShipError::Collation { .. })
        ));
    }

    #[test]
    fn multiply_then_unmultiply_restores_exactly() {
        let mut t = tree();
        let before = t.get("engine.speedCoef").unwrap();
        t.multiply("engine.speedCoef", 3.0).unwrap();
        assert_ne!(t.get("engine.speedCoef").unwrap(), before);
        t.unmultiply("engine.speedCoef", 3.0).unwrap();
        assert_eq!(t.get("engine.speedCoef").unwrap(), before);
    }

    #[test]
    fn removing_one_of_two_stacked_factors() {
        let mut t = tree();
        t.multiply("engine.speedCoef", 1.1).unwrap();
        t.multiply("engine.speedCoef", 0.7).unwrap();
        t.unmultiply("engine.speedCoef", 1.1).unwrap();
        assert_eq!(t.get("engine.speedCoef").unwrap(), json!(0.1 * 0.7));
    }

    #[test]
    fn integer_originals_survive_round_trip() {
        let mut t = tree();
        t.multiply("artillery.maxDist", 1.2).unwrap();
        t.unmultiply("artillery.maxDist", 1.2).unwrap();
        assert_eq!(t.get("artillery.maxDist").unwrap(), json!(15000));
    }

    #[test]
    fn multiply_wildcard_touches_every_numeric_match() {
        let mut t = tree();
        let changed = t.multiply("artillery.HP_*.rotationSpeed.*", 2.0).unwrap();
        assert_eq!(changed, 6);
        assert_eq!(
            t.get("artillery.HP_*.rotationSpeed").unwrap(),
            json!([[12.0, 12.0], [12.0, 12.0], [16.0, 16.0]])
        );
        // Non-numeric leaves are skipped.
        assert_eq!(t.multiply("artillery.HP_*.ammoList", 2.0).unwrap(), 0);
    }

    #[test]
    fn clear_restores_originals() {
        let mut t = tree();
        t.multiply("engine.value", 2.0).unwrap();
        t.multiply("engine.value", 5.0).unwrap();
        t.multiply("a.*.value", 3.0).unwrap();
        t.clear();
        assert_eq!(t.root(), tree().root());
    }

    #[test]
    fn fresh_copy_is_pristine_and_independent() {
        let mut t = tree();
        t.multiply("engine.value", 2.0).unwrap();
        let mut fresh = t.fresh_copy();
        assert_eq!(fresh.get("engine.value").unwrap(), json!(3.0));
        fresh.multiply("engine.value", 10.0).unwrap();
        assert_eq!(t.get("engine.value").unwrap(), json!(6.0));
    }

    #[test]
    fn clone_current_keeps_values_but_not_tracking() {
        let mut t = tree();
        t.multiply("engine.value", 2.0).unwrap();
        let mut copy = t.clone_current();
        assert_eq!(copy.get("engine.value").unwrap(), json!(6.0));
        copy.clear();
        assert_eq!(copy.get("engine.value").unwrap(), json!(6.0));
    }

    #[test]
    fn rejects_unusable_factors() {
        let mut t = tree();
        assert_eq!(
            t.multiply("engine.value", 0.0),
            Err(ShipError::InvalidFactor(0.0))
        );
        assert!(t.unmultiply("engine.value", f64::NAN).is_err());
    }
}
