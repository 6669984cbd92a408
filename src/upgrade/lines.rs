//! Module lines: per-`ucType` chains of modules ordered from stock to top.
//!
//! Modules arrive unordered and reference their predecessor by key. The
//! predecessor may belong to a different line (legacy research trees), so the
//! distance from a line root is tracked globally while placement is per line.

use crate::error::{Result, ShipError};
use crate::upgrade::module::Module;

use log::debug;
use std::collections::{BTreeMap, VecDeque};

/// ucType -> modules, index 0 = stock, last = top.
pub type ModuleLines = BTreeMap<String, Vec<Module>>;

/// Arrange modules into lines of strictly increasing distance from their root.
///
/// Fails with a data error if the `prev` references cannot all be resolved
/// (dangling reference or cycle), or if two modules of one line end up at the
/// same distance.
pub fn build_module_lines(modules: Vec<Module>) -> Result<ModuleLines> {
    let mut worklist: VecDeque<Module> = modules.into();
    let mut lines = ModuleLines::new();
    let mut distances: BTreeMap<String, usize> = BTreeMap::new();
    // Deferrals since the last successful placement.
    let mut stalled = 0usize;

    while let Some(module) = worklist.pop_front() {
        let distance = if module.is_root() {
            0
        } else {
            let predecessor = lines
                .values()
                .flatten()
                .find(|placed| placed.key == module.prev);
            match predecessor {
                Some(p) => distance_of(&distances, &p.key) + 1,
                None => {
                    debug!(
                        "predecessor {} of {} not placed yet, deferring",
                        module.prev, module.key
                    );
                    worklist.push_back(module);
                    stalled += 1;
                    if stalled >= worklist.len() {
                        return Err(stranded(&worklist));
                    }
                    continue;
                }
            }
        };

        let line = lines.entry(module.uc_type.clone()).or_default();
        let index = insertion_index(line, &distances, distance).ok_or_else(|| {
            ShipError::Data(format!(
                "module {} of line {} has the same distance ({}) as another module of that line",
                module.key, module.uc_type, distance
            ))
        })?;
        debug!(
            "placing {} in {} at index {} (distance {})",
            module.key, module.uc_type, index, distance
        );
        distances.insert(module.key.clone(), distance);
        line.insert(index, module);
        stalled = 0;
    }

    Ok(lines)
}

fn distance_of(distances: &BTreeMap<String, usize>, key: &str) -> usize {
    distances.get(key).copied().unwrap_or_default()
}

/// Index `i` such that line[i - 1] < distance < line[i], with -oo/+oo at the ends.
fn insertion_index(
    line: &[Module],
    distances: &BTreeMap<String, usize>,
    distance: usize,
) -> Option<usize> {
    (0..=line.len()).find(|&i| {
        let lower = i
            .checked_sub(1)
            .map(|left| distance_of(distances, &line[left].key));
        let upper = line.get(i).map(|right| distance_of(distances, &right.key));
        lower.is_none_or(|l| l < distance) && upper.is_none_or(|u| distance < u)
    })
}

fn stranded(worklist: &VecDeque<Module>) -> ShipError {
    let detail = worklist
        .iter()
        .map(|m| format!("{} (prev {})", m.key, m.prev))
        .collect::<Vec<_>>()
        .join(", ");
    ShipError::Data(format!(
        "cannot resolve predecessors of modules: {} (dangling reference or cycle)",
        detail
    ))
}
