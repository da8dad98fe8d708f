//! Diagnose boundary: validator + evaluator behind a single entry point.
//!
//! Internally the outcome is a tagged `Result<Diagnosis, DiagnosticError>` so
//! callers can tell "valid reading, NORMAL" apart from "invalid reading"
//! without comparing strings. [`Diagnostician::diagnose`] collapses both sides
//! into a `Diagnosis` and never lets a failure escape.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditRecord, AuditSink};
use crate::evaluator;
use crate::request::MalformedRequest;
use crate::types::{Diagnosis, RawReading, Telemetry, ThresholdTable};
use crate::validator::{validate, ValidationError};

/// Signature of the evaluation step.
pub type EvaluateFn = fn(&Telemetry, &ThresholdTable) -> Diagnosis;

/// Why a request did not produce a regular finding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticError {
    /// Non-numeric or missing input (SENSOR_FAULT).
    #[error("malformed request: {0}")]
    Malformed(#[from] MalformedRequest),

    /// Reading outside physical bounds (DATA_ERROR).
    #[error("data validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Fault inside the evaluator (SYSTEM_ERROR). Unreachable in correct code.
    #[error("internal failure: {0}")]
    System(String),
}

impl DiagnosticError {
    /// Convert into the diagnosis reported to the caller.
    pub fn into_diagnosis(self) -> Diagnosis {
        match self {
            Self::Malformed(e) => Diagnosis::sensor_fault(e.to_string()),
            Self::Validation(e) => {
                let details = e.to_string();
                Diagnosis::data_error(details, e.into_violations())
            }
            // Internal detail goes to the audit trail, not to the user.
            Self::System(_) => Diagnosis::system_error(),
        }
    }
}

/// Validator + evaluator bound to a threshold table.
///
/// Stateless and `Copy`; share one across threads freely.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostician {
    limits: ThresholdTable,
    evaluator: EvaluateFn,
}

impl Default for Diagnostician {
    fn default() -> Self {
        Self::standard()
    }
}

impl Diagnostician {
    /// Compiled-in thresholds and the standard rule table.
    pub const fn standard() -> Self {
        Self {
            limits: ThresholdTable::STANDARD,
            evaluator: evaluator::evaluate,
        }
    }

    /// Replace the evaluation step. Lets tests drive the SYSTEM_ERROR path.
    #[must_use]
    pub const fn with_evaluator(mut self, evaluator: EvaluateFn) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub const fn limits(&self) -> &ThresholdTable {
        &self.limits
    }

    /// Tagged outcome for one reading. No audit side effects.
    pub fn assess(&self, raw: RawReading) -> Result<Diagnosis, DiagnosticError> {
        let telemetry = validate(raw)?;
        self.evaluate_contained(&telemetry)
    }

    /// Diagnose one reading. Always returns a diagnosis.
    pub fn diagnose(&self, raw: RawReading, audit: &dyn AuditSink) -> Diagnosis {
        let request_id = Uuid::new_v4();
        audit.record(AuditRecord::new(request_id, AuditEvent::Received(raw)));

        let outcome = validate(raw)
            .map_err(DiagnosticError::from)
            .and_then(|telemetry| {
                audit.record(AuditRecord::new(request_id, AuditEvent::Validated(telemetry)));
                self.evaluate_contained(&telemetry)
            });

        Self::finish(request_id, outcome, audit)
    }

    /// Diagnose a decoded JSON request. Malformed requests become SENSOR_FAULT.
    pub fn diagnose_value(&self, request: &Value, audit: &dyn AuditSink) -> Diagnosis {
        match RawReading::try_from(request) {
            Ok(raw) => self.diagnose(raw, audit),
            Err(e) => Self::undecoded(request.to_string(), e, audit),
        }
    }

    /// Diagnose a raw JSON request body.
    pub fn diagnose_json(&self, body: &str, audit: &dyn AuditSink) -> Diagnosis {
        match RawReading::from_json_str(body) {
            Ok(raw) => self.diagnose(raw, audit),
            Err(e) => Self::undecoded(body.to_string(), e, audit),
        }
    }

    /// Audit the body as received, then report SENSOR_FAULT.
    fn undecoded(body: String, error: MalformedRequest, audit: &dyn AuditSink) -> Diagnosis {
        let request_id = Uuid::new_v4();
        audit.record(AuditRecord::new(request_id, AuditEvent::Undecoded(body)));
        Self::finish(request_id, Err(error.into()), audit)
    }

    fn evaluate_contained(&self, telemetry: &Telemetry) -> Result<Diagnosis, DiagnosticError> {
        let evaluator = self.evaluator;
        let limits = &self.limits;
        catch_unwind(AssertUnwindSafe(|| evaluator(telemetry, limits)))
            .map_err(|payload| DiagnosticError::System(panic_message(payload.as_ref())))
    }

    fn finish(
        request_id: Uuid,
        outcome: Result<Diagnosis, DiagnosticError>,
        audit: &dyn AuditSink,
    ) -> Diagnosis {
        let diagnosis = match outcome {
            Ok(diagnosis) => diagnosis,
            Err(e) => {
                let event = match &e {
                    DiagnosticError::System(msg) => AuditEvent::Faulted(msg.clone()),
                    _ => AuditEvent::Rejected(e.to_string()),
                };
                audit.record(AuditRecord::new(request_id, event));
                e.into_diagnosis()
            }
        };
        audit.record(AuditRecord::new(
            request_id,
            AuditEvent::Diagnosed(diagnosis.clone()),
        ));
        diagnosis
    }
}

/// Text of a panic payload, for the audit trail and the panic hook.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with unknown payload".to_string()
    }
}

/// Diagnose with the standard thresholds.
pub fn diagnose(raw: RawReading, audit: &dyn AuditSink) -> Diagnosis {
    Diagnostician::standard().diagnose(raw, audit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::types::{MaintenanceStatus, TelemetryField};

    fn exploding(_: &Telemetry, _: &ThresholdTable) -> Diagnosis {
        panic!("rule table corrupted")
    }

    #[test]
    fn test_assess_distinguishes_invalid_from_normal() {
        let d = Diagnostician::standard();
        let ok = d.assess(RawReading::new(900.0, 1.0, 50.0, 5000)).unwrap();
        assert_eq!(ok.status(), MaintenanceStatus::Normal);

        let err = d.assess(RawReading::new(2500.0, 1.0, 50.0, 5000)).unwrap_err();
        match err {
            DiagnosticError::Validation(v) => assert!(v.names(TelemetryField::Egt)),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_failure_becomes_data_error() {
        let sink = MemoryAuditSink::new();
        let d = diagnose(RawReading::new(2500.0, 1.0, 50.0, 5000), &sink);
        assert_eq!(d.status(), MaintenanceStatus::DataError);
        assert_eq!(d.action(), "check data input");
        assert!(d.details().unwrap().contains("egt = 2500 exceeds the upper bound 2000"));
        assert_eq!(d.violations().len(), 1);
        assert!(d.confidence().is_none());
    }

    #[test]
    fn test_evaluator_panic_becomes_system_error() {
        let sink = MemoryAuditSink::new();
        let d = Diagnostician::standard()
            .with_evaluator(exploding)
            .diagnose(RawReading::new(900.0, 1.0, 50.0, 5000), &sink);
        assert_eq!(d.status(), MaintenanceStatus::SystemError);
        assert_eq!(d.action(), "contact support");
        // Panic text stays out of the user-facing details.
        assert!(!d.details().unwrap().contains("corrupted"));

        let faulted: Vec<_> = sink
            .records()
            .into_iter()
            .filter_map(|r| match r.event {
                AuditEvent::Faulted(msg) => Some(msg),
                _ => None,
            })
            .collect();
        assert_eq!(faulted, vec!["rule table corrupted".to_string()]);
    }

    #[test]
    fn test_audit_sees_every_stage() {
        let sink = MemoryAuditSink::new();
        let d = diagnose(RawReading::new(955.0, 1.0, 50.0, 5000), &sink);
        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0].event, AuditEvent::Received(_)));
        assert!(matches!(records[1].event, AuditEvent::Validated(_)));
        assert_eq!(records[2].event, AuditEvent::Diagnosed(d));
        let id = records[0].request_id;
        assert!(records.iter().all(|r| r.request_id == id));
    }

    #[test]
    fn test_rejected_reading_is_audited() {
        let sink = MemoryAuditSink::new();
        diagnose(RawReading::new(900.0, -1.0, 50.0, 5000), &sink);
        let events: Vec<_> = sink.records().into_iter().map(|r| r.event).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], AuditEvent::Rejected(ref m) if m.contains("vibration")));
    }

    #[test]
    fn test_malformed_json_becomes_sensor_fault() {
        let sink = MemoryAuditSink::new();
        let d = Diagnostician::standard().diagnose_json(r#"{"egt": "hot"}"#, &sink);
        assert_eq!(d.status(), MaintenanceStatus::SensorFault);
        assert!(d.details().unwrap().contains("egt"));
        // Never reached validation.
        assert!(sink
            .records()
            .iter()
            .all(|r| !matches!(r.event, AuditEvent::Received(_) | AuditEvent::Validated(_))));
    }

    #[test]
    fn test_undecodable_body_is_audited_verbatim() {
        let sink = MemoryAuditSink::new();
        let body = r#"{"egt": "hot", "vibration": 1.0}"#;
        Diagnostician::standard().diagnose_json(body, &sink);

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].event, AuditEvent::Undecoded(body.to_string()));
        assert!(matches!(records[1].event, AuditEvent::Rejected(_)));
        assert!(matches!(records[2].event, AuditEvent::Diagnosed(_)));
        let id = records[0].request_id;
        assert!(records.iter().all(|r| r.request_id == id));
    }

    #[test]
    fn test_undecodable_value_is_audited() {
        let sink = MemoryAuditSink::new();
        let request = serde_json::json!(["not", "an", "object"]);
        Diagnostician::standard().diagnose_value(&request, &sink);
        assert_eq!(
            sink.records()[0].event,
            AuditEvent::Undecoded(request.to_string())
        );
    }

    #[test]
    fn test_cycles_above_i64_are_diagnosed() {
        let sink = MemoryAuditSink::new();
        let d = Diagnostician::standard().diagnose_json(
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 18446744073709551615}"#,
            &sink,
        );
        assert_eq!(d.status(), MaintenanceStatus::Preventive);

        let d = Diagnostician::standard().diagnose_json(
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 1e20}"#,
            &sink,
        );
        assert_eq!(d.status(), MaintenanceStatus::Preventive);
        assert!(d.reason().unwrap().contains("100000000000000000000 cycles"));

        let d = Diagnostician::standard().diagnose_json(
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 1.5}"#,
            &sink,
        );
        assert_eq!(d.status(), MaintenanceStatus::SensorFault);
    }

    #[test]
    fn test_diagnose_value_matches_diagnose() {
        let sink = MemoryAuditSink::new();
        let d = Diagnostician::standard();
        let from_json = d.diagnose_value(
            &serde_json::json!({"egt": 900, "vibration": 1.0, "oil_pressure": 30, "cycles": 5000}),
            &sink,
        );
        let direct = d.diagnose(RawReading::new(900.0, 1.0, 30.0, 5000), &sink);
        assert_eq!(from_json, direct);
    }

    #[test]
    fn test_into_diagnosis_mapping() {
        assert_eq!(
            DiagnosticError::System("x".into()).into_diagnosis().status(),
            MaintenanceStatus::SystemError
        );
        assert_eq!(
            DiagnosticError::Malformed(MalformedRequest::NotAnObject)
                .into_diagnosis()
                .status(),
            MaintenanceStatus::SensorFault
        );
    }
}
