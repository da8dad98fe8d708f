//! Telemetry types: RawReading (untrusted input) and Telemetry (validated)

use serde::{Deserialize, Serialize};

/// One engine reading exactly as the caller supplied it.
///
/// Carries no invariants. Negative cycles, NaN temperatures and absurd
/// pressures are all representable; the validator decides what is plausible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Exhaust gas temperature (°C)
    pub egt: f64,
    /// N1 vibration (mils)
    pub vibration: f64,
    /// Oil pressure (PSI)
    pub oil_pressure: f64,
    /// Accumulated flight cycles. Signed and wide so negative and very large
    /// counts reach validation intact.
    pub cycles: i128,
}

impl RawReading {
    pub const fn new(egt: f64, vibration: f64, oil_pressure: f64, cycles: i128) -> Self {
        Self {
            egt,
            vibration,
            oil_pressure,
            cycles,
        }
    }
}

/// A reading that passed physical range validation.
///
/// Fields are private and the only constructor lives in the validator, so a
/// `Telemetry` in hand always satisfies every range invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    egt: f64,
    vibration: f64,
    oil_pressure: f64,
    cycles: u128,
}

impl Telemetry {
    /// Caller must have checked every physical bound.
    pub(crate) const fn new_unchecked(
        egt: f64,
        vibration: f64,
        oil_pressure: f64,
        cycles: u128,
    ) -> Self {
        Self {
            egt,
            vibration,
            oil_pressure,
            cycles,
        }
    }

    pub const fn egt(&self) -> f64 {
        self.egt
    }

    pub const fn vibration(&self) -> f64 {
        self.vibration
    }

    pub const fn oil_pressure(&self) -> f64 {
        self.oil_pressure
    }

    pub const fn cycles(&self) -> u128 {
        self.cycles
    }
}

/// Names of the four telemetry channels, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryField {
    Egt,
    Vibration,
    OilPressure,
    Cycles,
}

impl TelemetryField {
    pub const ALL: [Self; 4] = [Self::Egt, Self::Vibration, Self::OilPressure, Self::Cycles];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Egt => "egt",
            Self::Vibration => "vibration",
            Self::OilPressure => "oil_pressure",
            Self::Cycles => "cycles",
        }
    }
}

impl std::fmt::Display for TelemetryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
