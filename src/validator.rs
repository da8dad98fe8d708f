//! Telemetry validation: physical range checks on raw readings.
//!
//! Every channel is checked on every call so a rejected reading reports all
//! of its problems at once, not just the first one found.

use thiserror::Error;

use crate::types::physical_limits as limits;
use crate::types::{
    AllowedRange, FieldViolation, RawReading, Telemetry, TelemetryField, ViolationKind,
};

/// One or more channels outside their physical range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} field(s) out of physical range: {}", .violations.len(), join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// Whether `field` is among the violations.
    pub fn names(&self, field: TelemetryField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Allowed range for each channel.
pub fn allowed_range(field: TelemetryField) -> AllowedRange {
    match field {
        TelemetryField::Egt => AllowedRange::bounded(limits::EGT_MIN, limits::EGT_MAX),
        TelemetryField::Vibration => {
            AllowedRange::bounded(limits::VIBRATION_MIN, limits::VIBRATION_MAX)
        }
        TelemetryField::OilPressure => {
            AllowedRange::bounded(limits::OIL_PRESSURE_MIN, limits::OIL_PRESSURE_MAX)
        }
        #[allow(clippy::cast_precision_loss)]
        TelemetryField::Cycles => AllowedRange::at_least(limits::CYCLES_MIN as f64),
    }
}

fn check(field: TelemetryField, value: f64, violations: &mut Vec<FieldViolation>) {
    let allowed = allowed_range(field);
    if let Some(kind) = allowed.check(value) {
        violations.push(FieldViolation {
            field,
            value,
            kind,
            allowed,
        });
    }
}

/// Validate a raw reading, producing `Telemetry` only if all four channels
/// are inside their physical range.
pub fn validate(raw: RawReading) -> Result<Telemetry, ValidationError> {
    let mut violations = Vec::new();

    check(TelemetryField::Egt, raw.egt, &mut violations);
    check(TelemetryField::Vibration, raw.vibration, &mut violations);
    check(TelemetryField::OilPressure, raw.oil_pressure, &mut violations);

    // Cycles is integral by type; only the lower bound can be broken.
    let cycles = match u128::try_from(raw.cycles) {
        Ok(c) => c,
        Err(_) => {
            #[allow(clippy::cast_precision_loss)]
            violations.push(FieldViolation {
                field: TelemetryField::Cycles,
                value: raw.cycles as f64,
                kind: ViolationKind::BelowMinimum,
                allowed: allowed_range(TelemetryField::Cycles),
            });
            0
        }
    };

    if violations.is_empty() {
        Ok(Telemetry::new_unchecked(
            raw.egt,
            raw.vibration,
            raw.oil_pressure,
            cycles,
        ))
    } else {
        Err(ValidationError { violations })
    }
}

impl TryFrom<RawReading> for Telemetry {
    type Error = ValidationError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        validate(raw)
    }
}
