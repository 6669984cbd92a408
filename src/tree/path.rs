//! Dotted, wildcard-capable addresses into a data tree.
//!
//! Example: `artillery.HP_*.rotationSpeed.0`
//!
//! `*` inside a segment matches any run of word characters, so `*` alone matches
//! every key at that level and `HP_*` matches every key starting with `HP_`.
//! Array elements are addressed by their decimal index.

use crate::error::{Result, ShipError};

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Glob { raw: String, re: Regex },
}

impl Segment {
    fn parse(path: &str, raw: &str) -> Result<Segment> {
        if raw.is_empty() {
            return Err(ShipError::Path {
                path: path.to_string(),
                reason: "empty path segment".to_string(),
            });
        }
        if !raw.contains('*') {
            return Ok(Segment::Literal(raw.to_string()));
        }

        let pattern = raw
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\w*");
        let re = Regex::new(&format!("^{}$", pattern)).map_err(|e| ShipError::Path {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Segment::Glob {
            raw: raw.to_string(),
            re,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == key,
            Segment::Glob { re, .. } => re.is_match(key),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Glob { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(lit) => lit,
            Segment::Glob { raw, .. } => raw,
        }
    }
}

/// A parsed path; never empty.
#[derive(Debug, Clone)]
pub struct TreePath {
    raw: String,
    segments: Vec<Segment>,
}

impl TreePath {
    pub fn parse(raw: &str) -> Result<TreePath> {
        let segments = raw
            .split('.')
            .map(|seg| Segment::parse(raw, seg))
            .collect::<Result<Vec<_>>>()?;
        Ok(TreePath {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for TreePath {
    type Err = ShipError;

    fn from_str(s: &str) -> Result<Self> {
        TreePath::parse(s)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Children of `node` whose key matches `segment`, in source order.
/// Scalars have no children.
pub(crate) fn matching<'a>(node: &'a Value, segment: &Segment) -> Vec<(String, &'a Value)> {
    match node {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| segment.matches(key))
            .map(|(key, child)| (key.clone(), child))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, child)| (i.to_string(), child))
            .filter(|(key, _)| segment.matches(key))
            .collect(),
        _ => Vec::new(),
    }
}

/// Escape a key for use inside a JSON pointer (RFC 6901).
pub(crate) fn pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
