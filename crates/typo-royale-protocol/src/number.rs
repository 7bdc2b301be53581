//! Lenient numeric payload fields.
//!
//! Browser clients send `totalRounds` and `score` as whatever their UI
//! produced: a number, a string read from an `<input>`, `null`, or
//! nothing at all. Rejecting those frames would drop the whole action, so
//! instead the field is captured as a [`LooseNumber`] and normalized where
//! it is used.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// A JSON value that is expected to be numeric but is not guaranteed to be.
///
/// Deserialization never fails: numbers become [`LooseNumber::Number`],
/// strings become [`LooseNumber::Text`], and everything else (`null`,
/// booleans, arrays, objects) becomes [`LooseNumber::Missing`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum LooseNumber {
    /// A JSON number.
    Number(f64),
    /// A JSON string, kept verbatim.
    Text(String),
    /// Absent, `null`, or a non-numeric, non-string value.
    #[default]
    Missing,
}

impl LooseNumber {
    /// Interprets the value as a round count: integer-parse semantics
    /// (fraction truncated, leading digits of a string), clamped to `>= 1`.
    ///
    /// Anything that does not yield a positive integer becomes `1`.
    pub fn round_count(&self) -> u32 {
        let parsed = match self {
            Self::Number(n) if n.is_finite() => Some(n.trunc()),
            Self::Text(s) => leading_integer(s).map(|n| n as f64),
            _ => None,
        };
        match parsed {
            Some(n) if n >= 1.0 => n.min(u32::MAX as f64) as u32,
            _ => 1,
        }
    }

    /// Interprets the value as a score delta.
    ///
    /// Only finite JSON numbers count; strings, `null`, and missing fields
    /// contribute `0.0`.
    pub fn finite_score(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            _ => 0.0,
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for LooseNumber {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for LooseNumber {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<'de> Deserialize<'de> for LooseNumber {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::Number(n),
            Raw::Text(s) => Self::Text(s),
            Raw::Other(_) => Self::Missing,
        })
    }
}

/// Parses an optional sign followed by decimal digits at the start of
/// `s` (after leading whitespace). Trailing characters are ignored.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    // Overlong digit runs saturate instead of failing.
    let value = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
