//! Reversible multiplicative effects on a configuration.
//!
//! A `Modifier` knows its target path, its factor and where it came from. Captains,
//! modernizations and camouflages each enumerate their modifiers for a given ship;
//! the ship applies and inverts them through its data tree.

pub mod camouflage;
pub mod captain;
pub mod modernization;
pub mod targets;

pub use camouflage::{Camouflage, CamouflageKind};
pub use captain::{Captain, Skill};
pub use modernization::Modernization;
pub use targets::{ModifierTarget, ModifierTargets, Retriever};

use crate::error::{Result, ShipError};
use crate::tree::{DataTree, TreePath};

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModifierSource {
    Skill { captain: String, skill: String },
    Modernization { name: String },
    Camouflage { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modifier {
    /// Raw effect name.
    pub effect: String,
    pub path: String,
    pub factor: f64,
    pub source: ModifierSource,
}

impl Modifier {
    /// Multiply every matching leaf by the factor. Returns the number of leaves touched.
    pub fn apply(&self, tree: &mut DataTree) -> Result<usize> {
        let touched = tree.multiply(&self.path, self.factor)?;
        if touched == 0 {
            debug!("{} ({}) matched nothing at {}", self.effect, self.factor, self.path);
        }
        Ok(touched)
    }

    /// Exact inverse of one `apply`.
    pub fn invert(&self, tree: &mut DataTree) -> Result<usize> {
        tree.unmultiply(&self.path, self.factor)
    }

    /// Fails exactly when `apply` or `invert` would, without touching a tree.
    pub fn check(&self) -> Result<()> {
        if !(self.factor.is_finite() && self.factor > 0.0) {
            return Err(ShipError::InvalidFactor(self.factor));
        }
        TreePath::parse(&self.path).map(|_| ())
    }

    /// Build modifiers from a raw `effect name -> value` object.
    ///
    /// Names missing from `targets` are skipped. So are values the target's retriever
    /// cannot read for `species`, and factors that are not finite and positive.
    pub fn from_effects(
        effects: &Map<String, Value>,
        species: &str,
        targets: &ModifierTargets,
        source: &ModifierSource,
    ) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        for (effect, raw) in effects {
            let Some(target) = targets.get(effect) else {
                debug!("no target for effect {}, skipping", effect);
                continue;
            };
            let Some(factor) = target.retriever.retrieve(raw, species) else {
                debug!("effect {} has no value for {} ({})", effect, species, raw);
                continue;
            };
            if !(factor.is_finite() && factor > 0.0) {
                warn!("effect {} has unusable factor {}, skipping", effect, factor);
                continue;
            }
            modifiers.push(Modifier {
                effect: effect.clone(),
                path: target.path.clone(),
                factor,
                source: source.clone(),
            });
        }
        modifiers
    }
}

/// `typeinfo.type` and `typeinfo.species` of a raw game object.
pub(crate) fn typeinfo(object: &Value) -> (Option<&str>, Option<&str>) {
    let info = object.get("typeinfo");
    let field = |name: &str| info.and_then(|i| i.get(name)).and_then(Value::as_str);
    (field("type"), field("species"))
}

/// The raw `modifiers` object, or an empty one.
pub(crate) fn raw_effects(object: &Value) -> Map<String, Value> {
    object
        .get("modifiers")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
