//! Coercion of request values into integers.
//!
//! Identifiers and quantities arrive as JSON numbers, JSON strings, or raw
//! path/query segments. All of them must end up as 32-bit signed integers,
//! matching the storage column type.

use serde_json::Value;
use thiserror::Error;

/// Errors raised when a value cannot be turned into an integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// No value was supplied.
    #[error("value is required")]
    Missing,

    /// The value is not an integer.
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    /// The value is an integer but does not fit in 32 bits.
    #[error("{0} is out of range")]
    OutOfRange(String),
}

/// Parses a textual integer, tolerating surrounding whitespace.
pub fn parse_integer(raw: &str) -> Result<i32, CoercionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoercionError::Missing);
    }

    match trimmed.parse::<i64>() {
        Ok(n) => narrow(n, trimmed),
        Err(_) => Err(CoercionError::NotAnInteger(raw.to_string())),
    }
}

/// Coerces an optional JSON value into an integer.
///
/// Accepts integers, floats without a fractional part, and numeric strings.
/// `null` counts as missing.
pub fn coerce_integer(value: Option<&Value>) -> Result<i32, CoercionError> {
    match value {
        None | Some(Value::Null) => Err(CoercionError::Missing),
        Some(Value::String(s)) => parse_integer(s),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                narrow(i, &n.to_string())
            } else if let Some(f) = n.as_f64()
                && f.fract() == 0.0
            {
                if f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
                    Err(CoercionError::OutOfRange(n.to_string()))
                } else {
                    Ok(f as i32)
                }
            } else {
                Err(CoercionError::NotAnInteger(n.to_string()))
            }
        }
        Some(other) => Err(CoercionError::NotAnInteger(other.to_string())),
    }
}

fn narrow(n: i64, raw: &str) -> Result<i32, CoercionError> {
    i32::try_from(n).map_err(|_| CoercionError::OutOfRange(raw.to_string()))
}
