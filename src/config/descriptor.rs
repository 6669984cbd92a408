//! Equip descriptors: which module of every line to mount.
//!
//! Grammar:
//!   descriptor := "stock" | "top" | clause ("," clause)*
//!   clause     := type ":" level
//!   type       := ["_"] letters        (module line, case-insensitive) | "others"
//!   level      := "stock" | "top" | digits
//!
//! Examples:
//! - `stock`: first module of every line (same as `others: stock`)
//! - `engine: stock, _Hull: top`: only valid if the ship has no other lines
//! - `torpedoes: 1, others: top`

use crate::error::{Result, ShipError};
use crate::upgrade::{Module, ModuleLines};

use regex::Regex;
use std::collections::BTreeSet;

const CLAUSE_RE: &str = r"^(_?[A-Za-z]+)\s*:\s*(top|stock|\d+)$";
const OTHERS: &str = "others";

/// In-game names that refer to the same module line.
const TYPE_ALIASES: &[(&str, &str)] = &[("suo", "firecontrol")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Stock,
    Top,
    Index(usize),
}

impl Level {
    fn parse(raw: &str) -> Option<Level> {
        match raw {
            "stock" => Some(Level::Stock),
            "top" => Some(Level::Top),
            digits => digits.parse().ok().map(Level::Index),
        }
    }

    fn index_in(self, len: usize) -> Option<usize> {
        match self {
            Level::Stock if len > 0 => Some(0),
            Level::Top => len.checked_sub(1),
            Level::Index(i) if i < len => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Type as written, for error messages.
    pub written: String,
    /// Canonical line name (no underscore, lower case, aliases folded).
    pub line: String,
    pub level: Level,
}

/// A parsed (not yet line-checked) descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    raw: String,
    clauses: Vec<Clause>,
    others: Option<Level>,
}

/// Canonical form of a line name: `_FireControl`, `fireControl` and `suo` agree.
pub fn canonical_type(name: &str) -> String {
    let lowered = name.trim_start_matches('_').to_ascii_lowercase();
    TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lowered)
}

impl Descriptor {
    pub fn parse(raw: &str) -> Result<Descriptor> {
        let text = raw.trim();
        let text = match text {
            "stock" => "others: stock",
            "top" => "others: top",
            other => other,
        };

        let re = Regex::new(CLAUSE_RE).map_err(|e| ShipError::descriptor(raw, e.to_string()))?;

        let mut clauses = Vec::new();
        let mut others = None;
        for part in text.split(',').map(str::trim) {
            let caps = re
                .captures(part)
                .ok_or_else(|| ShipError::descriptor(raw, format!("malformed clause {:?}", part)))?;
            let written = &caps[1];
            let level = Level::parse(&caps[2])
                .ok_or_else(|| ShipError::descriptor(raw, format!("bad level in {:?}", part)))?;

            let line = canonical_type(written);
            if line == OTHERS {
                if others.replace(level).is_some() {
                    return Err(ShipError::descriptor(raw, "'others' given more than once"));
                }
            } else {
                clauses.push(Clause {
                    written: written.to_string(),
                    line,
                    level,
                });
            }
        }

        Ok(Descriptor {
            raw: raw.to_string(),
            clauses,
            others,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn others(&self) -> Option<Level> {
        self.others
    }

    /// Pick exactly one module per line, in line order.
    ///
    /// Every line must be covered once, either explicitly or through `others`.
    pub fn select<'a>(&self, lines: &'a ModuleLines) -> Result<Vec<&'a Module>> {
        let mut levels: Vec<Option<Level>> = vec![None; lines.len()];
        let canonical: Vec<String> = lines.keys().map(|k| canonical_type(k)).collect();

        for clause in &self.clauses {
            let slot = canonical
                .iter()
                .position(|c| *c == clause.line)
                .ok_or_else(|| {
                    ShipError::descriptor(
                        &self.raw,
                        format!("ship has no module line {:?}", clause.written),
                    )
                })?;
            if levels[slot].replace(clause.level).is_some() {
                return Err(ShipError::descriptor(
                    &self.raw,
                    format!("module line {:?} is given more than once", clause.written),
                ));
            }
        }

        let mut missing = BTreeSet::new();
        let mut selected = Vec::with_capacity(lines.len());
        for ((uc_type, line), level) in lines.iter().zip(levels) {
            let Some(level) = level.or(self.others) else {
                missing.insert(uc_type.as_str());
                continue;
            };
            let index = level.index_in(line.len()).ok_or_else(|| {
                ShipError::descriptor(
                    &self.raw,
                    format!(
                        "level {:?} out of range for {} ({} modules)",
                        level,
                        uc_type,
                        line.len()
                    ),
                )
            })?;
            selected.push(&line[index]);
        }

        if !missing.is_empty() {
            return Err(ShipError::descriptor(
                &self.raw,
                format!(
                    "no definition for module lines {}",
                    missing.into_iter().collect::<Vec<_>>().join(", ")
                ),
            ));
        }
        Ok(selected)
    }
}
