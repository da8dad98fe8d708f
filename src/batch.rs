//! JSON-lines batch driver.
//!
//! Reads one diagnose request per line and writes one diagnosis per line, in
//! input order. Bad lines, including bytes that are not UTF-8, become
//! SENSOR_FAULT diagnoses; only I/O failures stop the run.
//!
//! ```bash
//! echo '{"egt": 955, "vibration": 1.0, "oil_pressure": 50, "cycles": 5000}' \
//!     | engine-support batch
//! ```

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::audit::AuditSink;
use crate::diagnostician::Diagnostician;
use crate::types::MaintenanceStatus;

/// Per-status counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub requests: u64,
    pub by_status: BTreeMap<MaintenanceStatus, u64>,
}

impl BatchSummary {
    fn record(&mut self, status: MaintenanceStatus) {
        self.requests += 1;
        *self.by_status.entry(status).or_insert(0) += 1;
    }

    pub fn count(&self, status: MaintenanceStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Run every request from `reader` through `diagnostician`, writing results
/// to `writer`.
pub async fn run_batch<R, W>(
    mut reader: R,
    mut writer: W,
    diagnostician: &Diagnostician,
    audit: &dyn AuditSink,
) -> Result<BatchSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = BatchSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read request line")?;
        if read == 0 {
            break;
        }

        // Invalid UTF-8 is replaced, so the line fails decoding on its own.
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let diagnosis = diagnostician.diagnose_json(line, audit);
        let mut out = serde_json::to_vec(&diagnosis).context("Failed to encode diagnosis")?;
        out.push(b'\n');
        writer
            .write_all(&out)
            .await
            .context("Failed to write diagnosis")?;
        summary.record(diagnosis.status());
    }

    writer.flush().await.context("Failed to flush output")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;

    async fn run(input: &str) -> (BatchSummary, Vec<serde_json::Value>) {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> (BatchSummary, Vec<serde_json::Value>) {
        let mut out = Vec::new();
        let sink = MemoryAuditSink::new();
        let summary = run_batch(input, &mut out, &Diagnostician::standard(), &sink)
            .await
            .unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, lines)
    }

    #[tokio::test]
    async fn test_one_output_line_per_request_in_order() {
        let input = concat!(
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 5000}"#, "\n",
            "\n",
            r#"{"egt": 965, "vibration": 1.7, "oil_pressure": 50, "cycles": 5000}"#, "\n",
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 21000}"#, "\n",
        );
        let (summary, lines) = run(input).await;
        assert_eq!(summary.requests, 3);
        let statuses: Vec<_> = lines.iter().map(|v| v["status"].as_str().unwrap()).collect();
        assert_eq!(statuses, vec!["NORMAL", "CRITICAL", "PREVENTIVE"]);
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_the_batch() {
        let input = concat!(
            "not json\n",
            r#"{"egt": 2500, "vibration": 1.0, "oil_pressure": 50, "cycles": 5000}"#, "\n",
            r#"{"egt": 900, "vibration": 1.0, "oil_pressure": 30, "cycles": 5000}"#, "\n",
        );
        let (summary, lines) = run(input).await;
        assert_eq!(lines.len(), 3);
        assert_eq!(summary.count(MaintenanceStatus::SensorFault), 1);
        assert_eq!(summary.count(MaintenanceStatus::DataError), 1);
        assert_eq!(summary.count(MaintenanceStatus::Warning), 1);
        assert_eq!(summary.count(MaintenanceStatus::Normal), 0);
        assert_eq!(lines[2]["ata_chapter"], "79-00-00");
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_sensor_fault() {
        let mut input = Vec::new();
        input.extend_from_slice(
            br#"{"egt": 900, "vibration": 1.0, "oil_pressure": 50, "cycles": 5000}"#,
        );
        input.push(b'\n');
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(
            br#"{"egt": 965, "vibration": 1.7, "oil_pressure": 50, "cycles": 5000}"#,
        );

        let (summary, lines) = run_bytes(&input).await;
        assert_eq!(summary.requests, 3);
        let statuses: Vec<_> = lines.iter().map(|v| v["status"].as_str().unwrap()).collect();
        assert_eq!(statuses, vec!["NORMAL", "SENSOR_FAULT", "CRITICAL"]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (summary, lines) = run("").await;
        assert_eq!(summary, BatchSummary::default());
        assert!(lines.is_empty());
    }
}
