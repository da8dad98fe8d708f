//! Diagnostic evaluator
//!
//! Maps validated telemetry to exactly one diagnosis by walking an ordered
//! rule table. The first rule whose predicate holds decides the outcome and
//! nothing below it is consulted.
//!
//! ## Rule order
//!
//! 1. **CRITICAL**: vibration above `vib_max`, or vibration above 1.6 with EGT
//!    above `egt_critical` (ATA 72-00-00)
//! 2. **PREVENTIVE**: cycles above `cycles_life` (ATA 05-10-00)
//! 3. **WARNING**: low oil pressure and/or EGT above nominal (ATA 79-00-00 or
//!    72-00-00)
//! 4. **NORMAL**: fallback when nothing matched

pub mod rules;

pub use rules::Rule;

use crate::types::{Diagnosis, Telemetry, ThresholdTable};

/// Rules in precedence order. NORMAL is the fallback, not an entry.
pub static RULES: [Rule; 3] = [rules::CRITICAL, rules::PREVENTIVE, rules::WARNING];

/// First rule that matches, if any.
pub fn matching_rule(t: &Telemetry, limits: &ThresholdTable) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(t, limits))
}

/// Evaluate telemetry against the threshold table. Total: never fails.
pub fn evaluate(t: &Telemetry, limits: &ThresholdTable) -> Diagnosis {
    match matching_rule(t, limits) {
        Some(rule) => (rule.build)(t, limits),
        None => Diagnosis::normal(),
    }
}
