//! Decoding loosely-typed diagnose requests into a `RawReading`.
//!
//! Agent front ends hand over whatever JSON they extracted from free-form
//! input. Numbers are taken as-is and numeric strings are coerced; anything
//! else (missing keys, nulls, booleans, words) is a malformed request and
//! never reaches the validator.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{RawReading, TelemetryField};

/// The request could not be turned into four numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRequest {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("request must be a JSON object with egt, vibration, oil_pressure and cycles")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(TelemetryField),

    #[error("field '{field}' is not numeric (got {found})")]
    NotNumeric { field: TelemetryField, found: String },

    #[error("field 'cycles' must be a whole number (got {0})")]
    NonIntegralCycles(String),
}

impl RawReading {
    /// Parse a JSON request body.
    pub fn from_json_str(body: &str) -> Result<Self, MalformedRequest> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| MalformedRequest::InvalidJson(e.to_string()))?;
        Self::try_from(&value)
    }
}

impl TryFrom<&Value> for RawReading {
    type Error = MalformedRequest;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let obj = value.as_object().ok_or(MalformedRequest::NotAnObject)?;
        Ok(Self {
            egt: number(obj, TelemetryField::Egt)?,
            vibration: number(obj, TelemetryField::Vibration)?,
            oil_pressure: number(obj, TelemetryField::OilPressure)?,
            cycles: whole_number(obj, TelemetryField::Cycles)?,
        })
    }
}

fn present(obj: &Map<String, Value>, field: TelemetryField) -> Result<&Value, MalformedRequest> {
    match obj.get(field.as_str()) {
        None | Some(Value::Null) => Err(MalformedRequest::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn not_numeric(field: TelemetryField, found: &Value) -> MalformedRequest {
    MalformedRequest::NotNumeric {
        field,
        found: found.to_string(),
    }
}

fn number(obj: &Map<String, Value>, field: TelemetryField) -> Result<f64, MalformedRequest> {
    let v = present(obj, field)?;
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| not_numeric(field, v)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| not_numeric(field, v)),
        _ => Err(not_numeric(field, v)),
    }
}

/// Whole numbers of any magnitude are returned; the validator owns the range.
fn whole_number(obj: &Map<String, Value>, field: TelemetryField) -> Result<i128, MalformedRequest> {
    let v = present(obj, field)?;
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i128::from(i));
            }
            if let Some(u) = n.as_u64() {
                return Ok(i128::from(u));
            }
        }
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i128>() {
                return Ok(i);
            }
        }
        _ => {}
    }
    // Accept 21000.0 and 1e20 but not 1.5. The cast saturates.
    let f = number(obj, field)?;
    if f.is_finite() && f.fract() == 0.0 {
        #[allow(clippy::cast_possible_truncation)]
        return Ok(f as i128);
    }
    Err(MalformedRequest::NonIntegralCycles(v.to_string()))
}
