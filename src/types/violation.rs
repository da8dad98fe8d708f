//! Range violations reported by the telemetry validator

use serde::Serialize;

use super::TelemetryField;

/// How a value broke its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BelowMinimum,
    AboveMaximum,
    NotANumber,
}

/// Inclusive allowed range for a channel. `max = None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllowedRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl AllowedRange {
    pub const fn bounded(min: f64, max: f64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Self { min, max: None }
    }

    /// Classify `value` against the range; `None` when it is inside.
    pub fn check(&self, value: f64) -> Option<ViolationKind> {
        if value.is_nan() {
            return Some(ViolationKind::NotANumber);
        }
        if value < self.min {
            return Some(ViolationKind::BelowMinimum);
        }
        match self.max {
            Some(max) if value > max => Some(ViolationKind::AboveMaximum),
            _ => None,
        }
    }
}

impl std::fmt::Display for AllowedRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, ∞)", self.min),
        }
    }
}

/// One field that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: TelemetryField,
    pub value: f64,
    pub kind: ViolationKind,
    pub allowed: AllowedRange,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ViolationKind::BelowMinimum => write!(
                f,
                "{} = {} is below the minimum {} (allowed {})",
                self.field, self.value, self.allowed.min, self.allowed
            ),
            ViolationKind::AboveMaximum => write!(
                f,
                "{} = {} exceeds the upper bound {} (allowed {})",
                self.field,
                self.value,
                self.allowed.max.unwrap_or(f64::INFINITY),
                self.allowed
            ),
            ViolationKind::NotANumber => write!(
                f,
                "{} is not a number (allowed {})",
                self.field, self.allowed
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_range_is_inclusive() {
        let r = AllowedRange::bounded(0.0, 10.0);
        assert_eq!(r.check(0.0), None);
        assert_eq!(r.check(10.0), None);
        assert_eq!(r.check(-0.01), Some(ViolationKind::BelowMinimum));
        assert_eq!(r.check(10.01), Some(ViolationKind::AboveMaximum));
    }

    #[test]
    fn test_unbounded_range() {
        let r = AllowedRange::at_least(0.0);
        assert_eq!(r.check(1e12), None);
        assert_eq!(r.check(f64::INFINITY), None);
        assert_eq!(r.check(-1.0), Some(ViolationKind::BelowMinimum));
    }

    #[test]
    fn test_nan_and_infinities() {
        let r = AllowedRange::bounded(-50.0, 2000.0);
        assert_eq!(r.check(f64::NAN), Some(ViolationKind::NotANumber));
        assert_eq!(r.check(f64::INFINITY), Some(ViolationKind::AboveMaximum));
        assert_eq!(r.check(f64::NEG_INFINITY), Some(ViolationKind::BelowMinimum));
    }

    #[test]
    fn test_display_names_field_value_and_range() {
        let v = FieldViolation {
            field: TelemetryField::Egt,
            value: 2500.0,
            kind: ViolationKind::AboveMaximum,
            allowed: AllowedRange::bounded(-50.0, 2000.0),
        };
        assert_eq!(
            v.to_string(),
            "egt = 2500 exceeds the upper bound 2000 (allowed [-50, 2000])"
        );
    }
}
