//! Declarative filter-chain configuration.
//!
//! A filter chain arrives as a mapping with a `filters` key holding an
//! ordered sequence of entries, each discriminated by a `filtertype` key:
//!
//! ```yaml
//! filters:
//!   - filtertype: pattern
//!     kind: prefix
//!     value: snapshot-
//!   - filtertype: age
//!     source: creation_date
//!     direction: older
//!     unit: days
//!     unit_count: 30
//! ```
//!
//! [`FilterSpec::parse_chain`] validates the structure of every entry before
//! any filter runs, so a malformed chain never mutates a working set.
//! Parameter-level problems (a bad unit, a missing direction) are not
//! checked here; they surface when the corresponding filter is built.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_error::{Result, SiftError};
use std::fmt;
use std::str::FromStr;

/// The closed set of filter discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Filter by reported snapshot state
    State,

    /// Filter by name pattern (prefix, suffix, regex, timestring)
    Pattern,

    /// Filter by resolved age against a threshold
    Age,

    /// No-op sentinel; leaves the working set untouched
    None,
}

impl FilterType {
    /// The configuration name of this filter type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Pattern => "pattern",
            Self::Age => "age",
            Self::None => "none",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterType {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "state" => Ok(Self::State),
            "pattern" => Ok(Self::Pattern),
            "age" => Ok(Self::Age),
            "none" => Ok(Self::None),
            other => Err(SiftError::Configuration(format!(
                "'{other}' is not a filtertype. Expected one of: state, pattern, age, none"
            ))),
        }
    }
}

/// One validated filter-chain entry: a discriminator plus its parameters.
///
/// Parameters are kept as raw JSON values; typed extraction happens through
/// the accessor methods so that type mismatches surface as [`SiftError::InvalidValue`]
/// at the filter boundary, uniformly for YAML- and JSON-sourced chains.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    /// The filter discriminator
    pub filtertype: FilterType,

    /// Remaining entry keys, passed to the filter as named parameters
    pub params: serde_json::Map<String, Value>,
}

impl FilterSpec {
    /// Validate a single chain entry.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Configuration`] when the entry is not a mapping,
    /// the `filtertype` key is missing, its value is not a string, or the
    /// string names no known filter type.
    pub fn from_value(entry: &Value) -> Result<Self> {
        let map = entry.as_object().ok_or_else(|| {
            SiftError::Configuration(format!("Filter entry must be a mapping, got: {entry}"))
        })?;

        let discriminator = map.get("filtertype").ok_or_else(|| {
            SiftError::Configuration("Filter entry has no 'filtertype' key".to_string())
        })?;

        let name = discriminator.as_str().ok_or_else(|| {
            SiftError::Configuration(format!(
                "'filtertype' must be a string, got: {discriminator}"
            ))
        })?;

        let filtertype = name.parse::<FilterType>()?;

        let params = map
            .iter()
            .filter(|(key, _)| key.as_str() != "filtertype")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self { filtertype, params })
    }

    /// Validate a whole chain configuration.
    ///
    /// The configuration is a mapping possibly containing a `filters` key.
    /// An absent, null, or empty `filters` key is a legal no-op chain.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Configuration`] if `filters` is present but not a
    /// sequence, or if any entry fails [`FilterSpec::from_value`].
    pub fn parse_chain(config: &Value) -> Result<Vec<Self>> {
        let filters = match config.get("filters") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(value) => value,
        };

        let entries = filters.as_array().ok_or_else(|| {
            SiftError::Configuration(format!("'filters' must be a sequence, got: {filters}"))
        })?;

        entries.iter().map(Self::from_value).collect()
    }

    /// Get a string parameter.
    ///
    /// Absent keys return `Ok(None)`; present non-string values are an
    /// [`SiftError::InvalidValue`] error.
    pub fn str_param(&self, key: &str) -> Result<Option<&str>> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(SiftError::InvalidValue(format!(
                "Filter parameter '{key}' must be a string, got: {other}"
            ))),
        }
    }

    /// Get a boolean parameter, defaulting to `false` when absent.
    pub fn bool_param(&self, key: &str) -> Result<bool> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(SiftError::InvalidValue(format!(
                "Filter parameter '{key}' must be a boolean, got: {other}"
            ))),
        }
    }

    /// Get an integer parameter.
    pub fn int_param(&self, key: &str) -> Result<Option<i64>> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
                SiftError::InvalidValue(format!(
                    "Filter parameter '{key}' must be an integer, got: {n}"
                ))
            }),
            Some(other) => Err(SiftError::InvalidValue(format!(
                "Filter parameter '{key}' must be an integer, got: {other}"
            ))),
        }
    }

    /// Get a raw parameter value, if present.
    pub fn raw_param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}
