use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal supplied by the caller or by configuration and injected into SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Parses the `key=value` form used on the command line: integers, reals,
    /// `true`/`false` and `null` are typed, everything else is text.
    pub fn parse_loose(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("null") {
            return Self::Null;
        }
        if let Ok(flag) = raw.parse::<bool>() {
            return Self::Boolean(flag);
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Integer(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            if value.is_finite() {
                return Self::Real(value);
            }
        }
        Self::Text(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A page request. `offset` rows are skipped, at most `limit` are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// One-based page number with a fixed page size. Page 0 is treated as page 1.
    pub fn of(current: u64, size: u64) -> Self {
        Self {
            limit: size,
            offset: current.saturating_sub(1).saturating_mul(size),
        }
    }
}
