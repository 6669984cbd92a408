//! Error taxonomy for the ship model.
//!
//! Anything "not applicable" (already equipped, ineligible, not found) is reported
//! through a `bool` return by the caller-facing methods, not through these types.

use thiserror::Error;

/// Errors raised by the ship model while building or mutating a ship.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShipError {
    /// Equip descriptor is malformed or does not cover every module line.
    #[error("invalid descriptor {descriptor:?}: {reason}")]
    Descriptor { descriptor: String, reason: String },

    /// Source data is malformed: module lines that cannot be built, unreadable input.
    #[error("data error: {0}")]
    Data(String),

    /// A game object of the wrong kind was passed where another was expected.
    #[error("expected a {expected} but got {found}")]
    TypeArgument {
        expected: &'static str,
        found: String,
    },

    /// Corpus has no object under this key.
    #[error("no game object '{0}' in corpus")]
    NotFound(String),

    /// Tree path could not be parsed.
    #[error("invalid path '{path}': {reason}")]
    Path { path: String, reason: String },

    /// Multiplicative factor that cannot be applied and later inverted.
    #[error("modifier factor {0} is not a positive finite number")]
    InvalidFactor(f64),

    /// Collated read found disagreeing values (or none at all).
    #[error("cannot collate values at '{path}': {reason}")]
    Collation { path: String, reason: String },
}

impl ShipError {
    pub(crate) fn descriptor(descriptor: &str, reason: impl Into<String>) -> Self {
        ShipError::Descriptor {
            descriptor: descriptor.to_string(),
            reason: reason.into(),
        }
    }
}

/// One violated corpus invariant together with every object that violates it.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("checking invariant '{invariant}' failed: violated by {}", .counterexamples.join(", "))]
pub struct InvariantError {
    pub invariant: String,
    pub counterexamples: Vec<String>,
}

impl InvariantError {
    pub fn new(invariant: impl Into<String>, counterexamples: Vec<String>) -> Self {
        Self {
            invariant: invariant.into(),
            counterexamples,
        }
    }
}

/// Every invariant failure of a full corpus scan, raised once at the end.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{} corpus invariant(s) violated:\n{}", .errors.len(), render(.errors))]
pub struct InvariantViolations {
    pub errors: Vec<InvariantError>,
}

impl InvariantViolations {
    /// Names of the violated invariants, in check order.
    pub fn invariants(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.invariant.as_str()).collect()
    }
}

fn render(errors: &[InvariantError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T, E = ShipError> = std::result::Result<T, E>;
