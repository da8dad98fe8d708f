//! Engine Support: turbofan health diagnosis
//!
//! Takes one engine telemetry reading (EGT, N1 vibration, oil pressure, cycles
//! since overhaul), rejects physically impossible values, and classifies the
//! rest into a maintenance disposition with an ATA chapter reference.
//!
//! ## Architecture
//!
//! - **Validator**: physical range checks, reporting every bad channel
//! - **Evaluator**: ordered rule table (CRITICAL > PREVENTIVE > WARNING > NORMAL)
//! - **Diagnostician**: the single entry point; never returns an error
//! - **Audit**: injected sink that sees every stage of a request
//!
//! ```
//! use engine_support::{diagnose, MaintenanceStatus, MemoryAuditSink, RawReading};
//!
//! let audit = MemoryAuditSink::new();
//! let d = diagnose(RawReading::new(965.0, 1.7, 50.0, 5000), &audit);
//! assert_eq!(d.status(), MaintenanceStatus::Critical);
//! ```

pub mod api;
pub mod audit;
pub mod batch;
pub mod config;
pub mod diagnostician;
pub mod evaluator;
pub mod logging;
pub mod request;
pub mod types;
pub mod validator;

pub use audit::{AuditEvent, AuditRecord, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use batch::{run_batch, BatchSummary};
pub use config::AppConfig;
pub use diagnostician::{diagnose, DiagnosticError, Diagnostician};
pub use evaluator::evaluate;
pub use request::MalformedRequest;
pub use types::{
    AtaChapter, Confidence, Diagnosis, MaintenanceStatus, RawReading, Telemetry, TelemetryField,
    ThresholdTable,
};
pub use validator::{validate, ValidationError};
