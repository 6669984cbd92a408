//! Derived statistics read through a configuration.
//!
//! One static table maps each stat to either a tree path or a pure function of
//! the tree. Values are computed on every read, so they always reflect the
//! modifiers currently applied. Per-mount stats use wildcard paths and come back
//! as one value per mount, since mounts of one ship may differ.

use crate::error::{Result, ShipError};
use crate::tree::{DataTree, GetOptions};

use serde::Serialize;
use serde_json::Value;

/// 1 BigWorld distance unit = 30 m.
pub const BW_TO_METERS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Stat {
    Ruddershift,
    Health,
    TurningCircle,
    Concealment,
    Speed,
    ArtilleryRange,
    ArtilleryCaliber,
    ArtilleryRotationSpeed,
    TorpedoRange,
    TorpedoSpeed,
    TorpedoDamage,
    TorpedoFloodChance,
    AtbaRange,
}

#[derive(Debug, Clone, Copy)]
pub enum StatSource {
    /// Read with default collation: a single value, or an array for wildcard paths.
    Path(&'static str),
    Computed(fn(&DataTree) -> Result<Value>),
}

#[derive(Debug, Clone, Copy)]
pub struct StatDef {
    pub stat: Stat,
    pub name: &'static str,
    pub source: StatSource,
}

pub const STATS: &[StatDef] = &[
    StatDef {
        stat: Stat::Ruddershift,
        name: "ruddershift",
        source: StatSource::Path("hull.rudderTime"),
    },
    StatDef {
        stat: Stat::Health,
        name: "health",
        source: StatSource::Path("hull.health"),
    },
    StatDef {
        stat: Stat::TurningCircle,
        name: "turningCircle",
        source: StatSource::Path("hull.turningRadius"),
    },
    StatDef {
        stat: Stat::Concealment,
        name: "concealment",
        source: StatSource::Path("hull.visibilityFactor"),
    },
    StatDef {
        stat: Stat::Speed,
        name: "speed",
        source: StatSource::Computed(speed),
    },
    StatDef {
        stat: Stat::ArtilleryRange,
        name: "artilleryRange",
        source: StatSource::Computed(artillery_range),
    },
    StatDef {
        stat: Stat::ArtilleryCaliber,
        name: "artilleryCaliber",
        source: StatSource::Path("artillery.HP_*.barrelDiameter"),
    },
    StatDef {
        stat: Stat::ArtilleryRotationSpeed,
        name: "artilleryRotationSpeed",
        source: StatSource::Path("artillery.HP_*.rotationSpeed.0"),
    },
    StatDef {
        stat: Stat::TorpedoRange,
        name: "torpedoRange",
        source: StatSource::Computed(torpedo_range),
    },
    StatDef {
        stat: Stat::TorpedoSpeed,
        name: "torpedoSpeed",
        source: StatSource::Path("torpedoes.HP_*.ammoList.*.speed"),
    },
    StatDef {
        stat: Stat::TorpedoDamage,
        name: "torpedoDamage",
        source: StatSource::Path("torpedoes.HP_*.ammoList.*.alphaDamage"),
    },
    StatDef {
        stat: Stat::TorpedoFloodChance,
        name: "torpedoFloodChance",
        source: StatSource::Path("torpedoes.HP_*.ammoList.*.uwCritical"),
    },
    StatDef {
        stat: Stat::AtbaRange,
        name: "atbaRange",
        source: StatSource::Path("atba.maxDist"),
    },
];

impl Stat {
    pub fn def(self) -> &'static StatDef {
        // STATS rows are in declaration order.
        &STATS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn from_name(name: &str) -> Option<Stat> {
        STATS.iter().find(|d| d.name == name).map(|d| d.stat)
    }

    pub fn all() -> impl Iterator<Item = Stat> {
        STATS.iter().map(|d| d.stat)
    }
}

/// Evaluate one stat against the current state of `tree`.
pub fn evaluate(tree: &DataTree, stat: Stat) -> Result<Value> {
    match stat.def().source {
        StatSource::Path(path) => tree.get(path),
        StatSource::Computed(f) => f(tree),
    }
}

pub(crate) fn number(tree: &DataTree, path: &str) -> Result<f64> {
    let value = tree.get_with(path, GetOptions::collate(true))?;
    value.as_f64().ok_or_else(|| ShipError::Collation {
        path: path.to_string(),
        reason: format!("expected a number, found {}", value),
    })
}

fn to_value(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn speed(tree: &DataTree) -> Result<Value> {
    Ok(to_value(
        number(tree, "hull.maxSpeed")? * (1.0 - number(tree, "engine.speedCoef")?),
    ))
}

fn artillery_range(tree: &DataTree) -> Result<Value> {
    Ok(to_value(
        number(tree, "artillery.maxDist")? * number(tree, "fireControl.maxDistCoef")?,
    ))
}

/// Every number matched by a wildcard path, in source order.
fn numbers(tree: &DataTree, path: &str) -> Result<Vec<f64>> {
    let Value::Array(values) = tree.get_with(path, GetOptions::collate(false))? else {
        return Ok(Vec::new());
    };
    values
        .iter()
        .map(|value| {
            value.as_f64().ok_or_else(|| ShipError::Collation {
                path: path.to_string(),
                reason: format!("expected a number, found {}", value),
            })
        })
        .collect()
}

/// Per torpedo type, in metres.
fn torpedo_range(tree: &DataTree) -> Result<Value> {
    Ok(Value::Array(
        numbers(tree, "torpedoes.HP_*.ammoList.*.maxDist")?
            .into_iter()
            .map(|d| to_value(d * BW_TO_METERS))
            .collect(),
    ))
}
