//! Operational thresholds and physical sensor bounds
//!
//! Both sets of numbers are compiled in. Recalibrating a limit requires a new
//! build; nothing in the process can change them at runtime.

use serde::Serialize;

/// Operational limits for the engine health rules
pub mod engine_thresholds {
    // === Exhaust Gas Temperature ===
    /// EGT above this is outside the nominal band (°C)
    pub const EGT_MAX: f64 = 950.0;
    /// EGT above this is critical (°C)
    pub const EGT_CRITICAL: f64 = 960.0;

    // === N1 Vibration ===
    /// Upper edge of normal N1 vibration (mils)
    pub const VIB_NORMAL: f64 = 1.5;
    /// N1 vibration above this grounds the aircraft on its own (mils)
    pub const VIB_MAX: f64 = 2.0;
    /// Vibration above this is critical when combined with a critical EGT (mils)
    pub const VIB_COMBINED_FAULT: f64 = 1.6;

    // === Oil System ===
    /// Oil pressure below this raises a warning (PSI)
    pub const OIL_MIN: f64 = 40.0;

    // === Hard Time ===
    /// Flight cycles before mandatory overhaul
    pub const CYCLES_LIFE: u64 = 20_000;
}

/// Physically plausible sensor ranges. Readings outside are rejected as bad data.
pub mod physical_limits {
    /// EGT range (°C)
    pub const EGT_MIN: f64 = -50.0;
    pub const EGT_MAX: f64 = 2000.0;

    /// N1 vibration range (mils)
    pub const VIBRATION_MIN: f64 = 0.0;
    pub const VIBRATION_MAX: f64 = 10.0;

    /// Oil pressure range (PSI)
    pub const OIL_PRESSURE_MIN: f64 = 0.0;
    pub const OIL_PRESSURE_MAX: f64 = 200.0;

    /// Accumulated flight cycles. No upper bound.
    pub const CYCLES_MIN: i64 = 0;
}

/// Threshold table consumed by the evaluator.
///
/// The only instance production code uses is [`ThresholdTable::STANDARD`].
/// The struct is public so tests and embedders can reason about the limits
/// a diagnosis was made against; it deliberately does not implement
/// `Deserialize`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdTable {
    pub egt_max: f64,
    pub egt_critical: f64,
    pub vib_normal: f64,
    pub vib_max: f64,
    pub oil_min: f64,
    pub cycles_life: u64,
}

impl ThresholdTable {
    pub const STANDARD: Self = Self {
        egt_max: engine_thresholds::EGT_MAX,
        egt_critical: engine_thresholds::EGT_CRITICAL,
        vib_normal: engine_thresholds::VIB_NORMAL,
        vib_max: engine_thresholds::VIB_MAX,
        oil_min: engine_thresholds::OIL_MIN,
        cycles_life: engine_thresholds::CYCLES_LIFE,
    };
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::STANDARD
    }
}
