//! Serializable views of a ship for the command line.

use crate::config::Stat;
use crate::error::Result;
use crate::modifier::Modifier;
use crate::ship::{Ship, ShipInfo};
use crate::upgrade::ModuleLines;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub key: String,
    pub prev: String,
    pub components: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinesReport {
    pub ship: ShipInfo,
    /// ucType -> modules, stock first.
    pub lines: BTreeMap<String, Vec<ModuleView>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub ship: ShipInfo,
    pub descriptor: String,
    pub unresolved: Vec<String>,
    pub modernizations: Vec<String>,
    pub captain: Option<String>,
    pub skills: Vec<String>,
    pub camouflage: Option<String>,
    pub modifiers: Vec<Modifier>,
    /// Stat name -> value; `null` where the configuration lacks the component.
    pub stats: BTreeMap<&'static str, Value>,
}

pub fn lines_report(ship: &mut Ship) -> Result<LinesReport> {
    let info = ship.info().clone();
    let lines = ship.module_lines(false)?;
    Ok(LinesReport {
        ship: info,
        lines: module_views(lines),
    })
}

fn module_views(lines: &ModuleLines) -> BTreeMap<String, Vec<ModuleView>> {
    lines
        .iter()
        .map(|(uc_type, line)| {
            let views = line
                .iter()
                .map(|m| ModuleView {
                    key: m.key.clone(),
                    prev: m.prev.clone(),
                    components: m.components.clone(),
                })
                .collect();
            (uc_type.clone(), views)
        })
        .collect()
}

pub fn stats_report(ship: &Ship) -> StatsReport {
    let stats = Stat::all()
        .map(|stat| (stat.name(), ship.stat(stat).unwrap_or(Value::Null)))
        .collect();

    StatsReport {
        ship: ship.info().clone(),
        descriptor: ship.descriptor().to_string(),
        unresolved: ship.configuration().unresolved().to_vec(),
        modernizations: ship
            .modernizations()
            .iter()
            .map(|m| m.name().to_string())
            .collect(),
        captain: ship.captain().map(|c| c.name().to_string()),
        skills: ship
            .captain()
            .map(|c| {
                c.learned_for_ship(ship.info())
                    .map(|s| s.name.clone())
                    .collect()
            })
            .unwrap_or_default(),
        camouflage: ship.camouflage().map(|c| c.name().to_string()),
        modifiers: ship.active_modifiers(),
        stats,
    }
}
