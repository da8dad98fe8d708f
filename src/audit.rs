//! Audit trail for diagnose requests.
//!
//! The diagnostician reports each stage of a request to an injected
//! [`AuditSink`]. It holds no logging state of its own; where the records go
//! is the caller's choice.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::types::{Diagnosis, RawReading, Telemetry};

/// Tracing target used for audit events, so subscribers can route them.
pub const AUDIT_TARGET: &str = "audit";

/// One stage of a diagnose request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Raw reading accepted for analysis.
    Received(RawReading),
    /// Request body that could not be decoded into a reading, kept verbatim.
    Undecoded(String),
    /// Reading passed physical range validation.
    Validated(Telemetry),
    /// Final diagnosis returned to the caller (every request ends here).
    Diagnosed(Diagnosis),
    /// Request or reading rejected before evaluation.
    Rejected(String),
    /// Unexpected internal fault.
    Faulted(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditRecord {
    pub fn new(request_id: Uuid, event: AuditEvent) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

// ============================================================================
// Tracing sink
// ============================================================================

/// Emits every record as a structured `tracing` event on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        let id = record.request_id;
        match &record.event {
            AuditEvent::Received(raw) => info!(
                target: AUDIT_TARGET,
                request_id = %id,
                egt = raw.egt,
                vibration = raw.vibration,
                oil_pressure = raw.oil_pressure,
                cycles = %raw.cycles,
                "Analysis requested"
            ),
            AuditEvent::Undecoded(body) => info!(
                target: AUDIT_TARGET,
                request_id = %id,
                body = %body,
                "Analysis requested with undecodable body"
            ),
            AuditEvent::Validated(t) => info!(
                target: AUDIT_TARGET,
                request_id = %id,
                egt = t.egt(),
                vibration = t.vibration(),
                oil_pressure = t.oil_pressure(),
                cycles = %t.cycles(),
                "Telemetry validated"
            ),
            AuditEvent::Diagnosed(d) => info!(
                target: AUDIT_TARGET,
                request_id = %id,
                status = d.status().code(),
                ata_chapter = d.ata_chapter().map(|c| c.code()),
                confidence = d.confidence().map(|c| c.label()),
                action = d.action(),
                "Diagnosis: {}",
                d.status()
            ),
            AuditEvent::Rejected(reason) => warn!(
                target: AUDIT_TARGET,
                request_id = %id,
                reason = %reason,
                "Input rejected"
            ),
            AuditEvent::Faulted(message) => error!(
                target: AUDIT_TARGET,
                request_id = %id,
                error = %message,
                "Unexpected failure in analysis tool"
            ),
        }
    }
}

// ============================================================================
// In-memory sink
// ============================================================================

/// Keeps every record in memory. Useful for tests and for embedders that
/// forward audit data elsewhere in batches.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Drain and return all records.
    pub fn take(&self) -> Vec<AuditRecord> {
        std::mem::take(
            &mut *self
                .records
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(record);
    }
}
