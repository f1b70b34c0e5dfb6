//! Timestring patterns: strftime-style tokens embedded in snapshot names.
//!
//! A timestring such as `%Y.%m.%d` serves two purposes: it derives an
//! equivalent regular expression for pattern filtering, and it extracts an
//! epoch timestamp from a name that contains a matching substring.

use chrono::NaiveDate;
use regex::Regex;
use sift_error::{Result, SiftError};

/// A compiled timestring pattern.
///
/// Supported tokens: `%Y` (4-digit year), `%y` (2-digit year), `%m` (month),
/// `%d` (day), `%H` (hour), `%M` (minute), `%S` (second), `%j` (3-digit
/// ordinal day), `%%` (literal percent). All other characters match
/// literally.
///
/// # Example
///
/// ```
/// use sift_engine::Timestring;
///
/// let ts = Timestring::new("%Y.%m.%d").unwrap();
/// assert_eq!(ts.parse_epoch("snapshot-2015.03.01"), Some(1425168000));
/// assert_eq!(ts.parse_epoch("snap_name"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Timestring {
    pattern: String,
    regex: Regex,
}

impl Timestring {
    /// Compile a timestring pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::InvalidValue`] for an empty pattern, an unknown
    /// `%` token, a trailing bare `%`, or a repeated token (each may appear
    /// once).
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            // The derived regex would match every name at position zero
            return Err(SiftError::InvalidValue(
                "Timestring may not be empty".to_string(),
            ));
        }

        let mut source = String::new();
        let mut chars = pattern.chars();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                source.push_str(&regex::escape(&ch.to_string()));
                continue;
            }
            let token = chars.next().ok_or_else(|| {
                SiftError::InvalidValue(format!("Timestring '{pattern}' ends with a bare '%'"))
            })?;
            match token {
                'Y' => source.push_str(r"(?P<year>\d{4})"),
                'y' => source.push_str(r"(?P<year2>\d{2})"),
                'm' => source.push_str(r"(?P<month>\d{2})"),
                'd' => source.push_str(r"(?P<day>\d{2})"),
                'H' => source.push_str(r"(?P<hour>\d{2})"),
                'M' => source.push_str(r"(?P<minute>\d{2})"),
                'S' => source.push_str(r"(?P<second>\d{2})"),
                'j' => source.push_str(r"(?P<ordinal>\d{3})"),
                '%' => source.push_str("%"),
                other => {
                    return Err(SiftError::InvalidValue(format!(
                        "Unsupported timestring token '%{other}' in '{pattern}'"
                    )))
                }
            }
        }

        let regex = Regex::new(&source).map_err(|e| {
            SiftError::InvalidValue(format!("Timestring '{pattern}' is not usable: {e}"))
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The original pattern string.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The derived regular expression (unanchored).
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Consume the timestring, keeping only the derived regex.
    pub fn into_regex(self) -> Regex {
        self.regex
    }

    /// Extract an epoch timestamp from a name.
    ///
    /// Searches for the pattern anywhere in the name. Missing components
    /// default to month 1, day 1, 00:00:00; a name without a year component
    /// match defaults to 1900. Returns `None` when the pattern does not
    /// occur in the name or the matched digits form no valid date.
    pub fn parse_epoch(&self, name: &str) -> Option<i64> {
        let caps = self.regex.captures(name)?;

        let group = |g: &str| -> Option<u32> { caps.name(g).and_then(|m| m.as_str().parse().ok()) };

        let year = if let Some(y) = caps.name("year") {
            y.as_str().parse::<i32>().ok()?
        } else if let Some(y) = caps.name("year2") {
            // POSIX strptime century rule
            let y: i32 = y.as_str().parse().ok()?;
            if y <= 68 { 2000 + y } else { 1900 + y }
        } else {
            1900
        };

        let date = if let Some(ordinal) = group("ordinal") {
            NaiveDate::from_yo_opt(year, ordinal)?
        } else {
            NaiveDate::from_ymd_opt(year, group("month").unwrap_or(1), group("day").unwrap_or(1))?
        };

        let time = date.and_hms_opt(
            group("hour").unwrap_or(0),
            group("minute").unwrap_or(0),
            group("second").unwrap_or(0),
        )?;

        Some(time.and_utc().timestamp())
    }
}
