//! Pattern-based filtering of snapshot names.
//!
//! Four matcher kinds over the snapshot name: anchored prefix and suffix
//! (literal), full regular expression, and timestring (a date pattern
//! converted to its equivalent regex).

use regex::Regex;
use serde_json::Value;
use sift_error::{Result, SiftError};
use sift_types::SnapshotInfo;
use std::fmt;
use std::str::FromStr;

use super::SnapshotFilter;
use crate::timestring::Timestring;

/// How a pattern value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Name starts with the literal value
    Prefix,

    /// Name ends with the literal value
    Suffix,

    /// Value is a regular expression searched against the name
    Regex,

    /// Value is a timestring pattern searched against the name
    Timestring,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Suffix => "suffix",
            Self::Regex => "regex",
            Self::Timestring => "timestring",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prefix" => Ok(Self::Prefix),
            "suffix" => Ok(Self::Suffix),
            "regex" => Ok(Self::Regex),
            "timestring" => Ok(Self::Timestring),
            other => Err(SiftError::InvalidValue(format!(
                "'{other}' is not a pattern kind. Expected one of: prefix, suffix, regex, timestring"
            ))),
        }
    }
}

/// Coerce a configured pattern value to its string form.
///
/// This is the single, deliberate coercion point for pattern values: the
/// value must be a non-empty, non-null scalar. Defined non-string scalars
/// are stringified once and then treated uniformly, so integer `0` becomes
/// the pattern `"0"`, which for most name sets matches nothing and empties
/// the working set — preserved behavior, not an endorsement. An empty
/// string gets no such carve-out: it would derive a regex matching every
/// name, so it is rejected like `null`.
pub fn coerce_pattern_value(value: &Value) -> Result<String> {
    let pattern = match value {
        Value::Null => {
            return Err(SiftError::InvalidValue(
                "Pattern value may not be null".to_string(),
            ))
        }
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            return Err(SiftError::InvalidValue(format!(
                "Pattern value must be a scalar, got: {other}"
            )))
        }
    };
    if pattern.is_empty() {
        return Err(SiftError::InvalidValue(
            "Pattern value may not be empty".to_string(),
        ));
    }
    Ok(pattern)
}

/// A filter matching snapshot names against a derived regular expression.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sift_engine::{PatternFilter, PatternKind, SnapshotFilter};
/// use sift_types::SnapshotInfo;
///
/// let filter = PatternFilter::new(PatternKind::Prefix, &json!("snap"), false).unwrap();
///
/// assert!(filter.keep(&SnapshotInfo::new("snapshot-2015.03.01")));
/// assert!(!filter.keep(&SnapshotInfo::new("backup-2015.03.01")));
/// ```
#[derive(Debug, Clone)]
pub struct PatternFilter {
    kind: PatternKind,
    pattern: String,
    regex: Regex,
    exclude: bool,
}

impl PatternFilter {
    /// Create a pattern filter.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidValue`] when the value is null or
    /// non-scalar, the regex does not compile, or a timestring value
    /// contains an unknown token.
    pub fn new(kind: PatternKind, value: &Value, exclude: bool) -> Result<Self> {
        let pattern = coerce_pattern_value(value)?;

        let regex = match kind {
            PatternKind::Prefix => compile(&format!("^{}", regex::escape(&pattern)))?,
            PatternKind::Suffix => compile(&format!("{}$", regex::escape(&pattern)))?,
            PatternKind::Regex => compile(&pattern)?,
            PatternKind::Timestring => Timestring::new(&pattern)?.into_regex(),
        };

        Ok(Self {
            kind,
            pattern,
            regex,
            exclude,
        })
    }

    /// The coerced pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source)
        .map_err(|e| SiftError::InvalidValue(format!("Invalid pattern '{source}': {e}")))
}

impl SnapshotFilter for PatternFilter {
    fn matches(&self, info: &SnapshotInfo) -> bool {
        self.regex.is_match(&info.name)
    }

    fn exclude(&self) -> bool {
        self.exclude
    }

    fn description(&self) -> String {
        format!(
            "pattern(kind={}, value='{}', exclude={})",
            self.kind, self.pattern, self.exclude
        )
    }
}
