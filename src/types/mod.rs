//! Shared data structures for engine health diagnosis
//!
//! - RawReading: untrusted sensor values as received
//! - Telemetry: a reading that passed physical range validation
//! - ThresholdTable: compiled-in operational limits
//! - Diagnosis: the structured maintenance outcome

mod telemetry;
// Public so callers can reach `types::thresholds::engine_thresholds` directly.
pub mod thresholds;
mod violation;
mod diagnosis;

pub use telemetry::*;
pub use thresholds::*;
pub use violation::*;
pub use diagnosis::*;
