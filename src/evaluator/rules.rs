//! Individual diagnostic rules.
//!
//! Each rule is a predicate plus a builder. Predicates only compare; builders
//! assume their predicate held and format the finding.

use crate::types::engine_thresholds::VIB_COMBINED_FAULT;
use crate::types::{AtaChapter, Diagnosis, MaintenanceStatus, Telemetry, ThresholdTable};

/// A (predicate, outcome-builder) pair.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub status: MaintenanceStatus,
    pub matches: fn(&Telemetry, &ThresholdTable) -> bool,
    pub build: fn(&Telemetry, &ThresholdTable) -> Diagnosis,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CRITICAL (AOG)
// ============================================================================

pub const CRITICAL: Rule = Rule {
    name: "mechanical_failure_signature",
    status: MaintenanceStatus::Critical,
    matches: is_critical,
    build: critical,
};

/// Excess vibration alone, or marginal vibration with a critical EGT.
pub fn is_critical(t: &Telemetry, limits: &ThresholdTable) -> bool {
    t.vibration() > limits.vib_max
        || (t.vibration() > VIB_COMBINED_FAULT && t.egt() > limits.egt_critical)
}

pub fn critical(t: &Telemetry, _limits: &ThresholdTable) -> Diagnosis {
    Diagnosis::critical(format!(
        "severe mechanical failure signature: vibration {} mils / EGT {} °C",
        t.vibration(),
        t.egt()
    ))
}

// ============================================================================
// PREVENTIVE (hard time)
// ============================================================================

pub const PREVENTIVE: Rule = Rule {
    name: "hard_time_exceeded",
    status: MaintenanceStatus::Preventive,
    matches: is_past_hard_time,
    build: preventive,
};

pub fn is_past_hard_time(t: &Telemetry, limits: &ThresholdTable) -> bool {
    t.cycles() > u128::from(limits.cycles_life)
}

pub fn preventive(t: &Telemetry, _limits: &ThresholdTable) -> Diagnosis {
    Diagnosis::preventive(format!(
        "hard time limit exceeded ({} cycles)",
        t.cycles()
    ))
}

// ============================================================================
// WARNING (monitor)
// ============================================================================

pub const WARNING: Rule = Rule {
    name: "monitor",
    status: MaintenanceStatus::Warning,
    matches: needs_monitoring,
    build: warning,
};

pub fn is_low_oil_pressure(t: &Telemetry, limits: &ThresholdTable) -> bool {
    t.oil_pressure() < limits.oil_min
}

/// EGT above the nominal band but not yet critical.
pub fn is_egt_above_nominal(t: &Telemetry, limits: &ThresholdTable) -> bool {
    limits.egt_max < t.egt() && t.egt() <= limits.egt_critical
}

pub fn needs_monitoring(t: &Telemetry, limits: &ThresholdTable) -> bool {
    is_low_oil_pressure(t, limits) || is_egt_above_nominal(t, limits)
}

/// Oil is checked first and owns the chapter whenever it fires, including
/// when the EGT condition fires alongside it.
pub fn warning(t: &Telemetry, limits: &ThresholdTable) -> Diagnosis {
    let mut findings = Vec::with_capacity(2);
    let mut chapter = AtaChapter::Engine;

    if is_low_oil_pressure(t, limits) {
        findings.push(format!("low oil pressure ({} PSI)", t.oil_pressure()));
        chapter = AtaChapter::Oil;
    }

    if is_egt_above_nominal(t, limits) {
        findings.push(format!(
            "EGT above nominal ({} °C), trend monitoring suggested",
            t.egt()
        ));
    }

    Diagnosis::warning(findings.join("; "), chapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawReading;
    use crate::validator::validate;

    const LIMITS: ThresholdTable = ThresholdTable::STANDARD;

    fn telemetry(egt: f64, vibration: f64, oil_pressure: f64, cycles: i128) -> Telemetry {
        validate(RawReading::new(egt, vibration, oil_pressure, cycles)).unwrap()
    }

    #[test]
    fn test_critical_on_vibration_alone() {
        assert!(is_critical(&telemetry(900.0, 2.01, 50.0, 0), &LIMITS));
        assert!(!is_critical(&telemetry(900.0, 2.0, 50.0, 0), &LIMITS));
    }

    #[test]
    fn test_critical_on_combined_signature() {
        assert!(is_critical(&telemetry(965.0, 1.7, 50.0, 0), &LIMITS));
        // Either half alone is not enough.
        assert!(!is_critical(&telemetry(965.0, 1.6, 50.0, 0), &LIMITS));
        assert!(!is_critical(&telemetry(960.0, 1.7, 50.0, 0), &LIMITS));
    }

    #[test]
    fn test_critical_reason_reports_values() {
        let d = critical(&telemetry(965.0, 1.7, 50.0, 0), &LIMITS);
        let reason = d.reason().unwrap();
        assert!(reason.contains("1.7"), "{reason}");
        assert!(reason.contains("965"), "{reason}");
    }

    #[test]
    fn test_hard_time_boundary() {
        assert!(!is_past_hard_time(&telemetry(900.0, 1.0, 50.0, 20_000), &LIMITS));
        assert!(is_past_hard_time(&telemetry(900.0, 1.0, 50.0, 20_001), &LIMITS));
    }

    #[test]
    fn test_preventive_reason_reports_cycles() {
        let d = preventive(&telemetry(900.0, 1.0, 50.0, 21_000), &LIMITS);
        assert!(d.reason().unwrap().contains("21000 cycles"));
    }

    #[test]
    fn test_egt_band_is_half_open() {
        assert!(!is_egt_above_nominal(&telemetry(950.0, 1.0, 50.0, 0), &LIMITS));
        assert!(is_egt_above_nominal(&telemetry(950.5, 1.0, 50.0, 0), &LIMITS));
        assert!(is_egt_above_nominal(&telemetry(960.0, 1.0, 50.0, 0), &LIMITS));
        assert!(!is_egt_above_nominal(&telemetry(960.5, 1.0, 50.0, 0), &LIMITS));
    }

    #[test]
    fn test_oil_boundary() {
        assert!(!is_low_oil_pressure(&telemetry(900.0, 1.0, 40.0, 0), &LIMITS));
        assert!(is_low_oil_pressure(&telemetry(900.0, 1.0, 39.9, 0), &LIMITS));
    }

    #[test]
    fn test_warning_oil_only_uses_oil_chapter() {
        let d = warning(&telemetry(900.0, 1.0, 30.0, 0), &LIMITS);
        assert_eq!(d.ata_chapter(), Some(AtaChapter::Oil));
        assert_eq!(d.reason(), Some("low oil pressure (30 PSI)"));
    }

    #[test]
    fn test_warning_egt_only_uses_engine_chapter() {
        let d = warning(&telemetry(955.0, 1.0, 50.0, 0), &LIMITS);
        assert_eq!(d.ata_chapter(), Some(AtaChapter::Engine));
        assert!(d.reason().unwrap().starts_with("EGT above nominal (955 °C)"));
    }

    #[test]
    fn test_warning_both_joined_oil_first() {
        let d = warning(&telemetry(955.0, 1.0, 30.0, 0), &LIMITS);
        assert_eq!(d.ata_chapter(), Some(AtaChapter::Oil));
        assert_eq!(
            d.reason(),
            Some("low oil pressure (30 PSI); EGT above nominal (955 °C), trend monitoring suggested")
        );
    }
}
