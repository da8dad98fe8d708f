//! Diagnosis types: MaintenanceStatus, AtaChapter, Confidence, Diagnosis

use serde::Serialize;

use super::FieldViolation;

/// Recommended actions, one per status.
pub mod actions {
    pub const CRITICAL: &str =
        "ground the aircraft (AOG): mandatory borescope inspection and possible engine replacement";
    pub const PREVENTIVE: &str = "schedule engine removal for overhaul";
    pub const WARNING: &str = "perform ground-run tests and inspect filters";
    pub const NORMAL: &str = "cleared for service";
    pub const SENSOR_FAULT: &str = "verify sensor feed and resend reading";
    pub const DATA_ERROR: &str = "check data input";
    pub const SYSTEM_ERROR: &str = "contact support";
}

pub const NOMINAL_DETAILS: &str = "nominal parameters";
pub const SYSTEM_ERROR_DETAILS: &str = "internal failure in the analysis tool";

/// Maintenance status of a diagnosis
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Normal,
    Warning,
    Preventive,
    Critical,
    SensorFault,
    DataError,
    SystemError,
}

impl MaintenanceStatus {
    pub const ALL: [Self; 7] = [
        Self::Normal,
        Self::Warning,
        Self::Preventive,
        Self::Critical,
        Self::SensorFault,
        Self::DataError,
        Self::SystemError,
    ];

    /// Wire name, identical to the serialized form.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Preventive => "PREVENTIVE",
            Self::Critical => "CRITICAL",
            Self::SensorFault => "SENSOR_FAULT",
            Self::DataError => "DATA_ERROR",
            Self::SystemError => "SYSTEM_ERROR",
        }
    }

    /// Label shown to maintenance crews.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING (MONITOR)",
            Self::Preventive => "PREVENTIVE MAINT",
            Self::Critical => "CRITICAL (AOG)",
            Self::SensorFault => "SENSOR FAULT (INVALID DATA)",
            Self::DataError => "DATA ERROR",
            Self::SystemError => "SYSTEM ERROR",
        }
    }

    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::SensorFault | Self::DataError | Self::SystemError
        )
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// ATA 100 chapter the finding belongs to
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum AtaChapter {
    /// 05-10-00 Time limits
    #[serde(rename = "05-10-00")]
    TimeLimits,
    /// 72-00-00 Engine
    #[serde(rename = "72-00-00")]
    Engine,
    /// 79-00-00 Oil system
    #[serde(rename = "79-00-00")]
    Oil,
}

impl AtaChapter {
    pub const fn code(self) -> &'static str {
        match self {
            Self::TimeLimits => "05-10-00",
            Self::Engine => "72-00-00",
            Self::Oil => "79-00-00",
        }
    }
}

impl std::fmt::Display for AtaChapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Confidence in the finding. Serialized with the labels crews already use.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Confidence {
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Alta")]
    High,
    /// Count-based rule, not a heuristic.
    #[serde(rename = "Absoluta")]
    Absolute,
}

impl Confidence {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Medium => "Média",
            Self::High => "Alta",
            Self::Absolute => "Absoluta",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured maintenance diagnosis.
///
/// Which optional fields are present depends on the status. The fields are
/// private and every constructor is status-specific, so a DATA_ERROR can never
/// carry a confidence and a CRITICAL can never lack a chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    status: MaintenanceStatus,
    action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ata_chapter: Option<AtaChapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<FieldViolation>,
}

impl Diagnosis {
    fn finding(
        status: MaintenanceStatus,
        action: &str,
        reason: String,
        chapter: AtaChapter,
        confidence: Confidence,
    ) -> Self {
        Self {
            status,
            action: action.to_string(),
            reason: Some(reason),
            details: None,
            ata_chapter: Some(chapter),
            confidence: Some(confidence),
            violations: Vec::new(),
        }
    }

    fn failure(status: MaintenanceStatus, action: &str, details: String) -> Self {
        Self {
            status,
            action: action.to_string(),
            reason: None,
            details: Some(details),
            ata_chapter: None,
            confidence: None,
            violations: Vec::new(),
        }
    }

    pub fn critical(reason: String) -> Self {
        Self::finding(
            MaintenanceStatus::Critical,
            actions::CRITICAL,
            reason,
            AtaChapter::Engine,
            Confidence::High,
        )
    }

    pub fn preventive(reason: String) -> Self {
        Self::finding(
            MaintenanceStatus::Preventive,
            actions::PREVENTIVE,
            reason,
            AtaChapter::TimeLimits,
            Confidence::Absolute,
        )
    }

    pub fn warning(reason: String, chapter: AtaChapter) -> Self {
        Self::finding(
            MaintenanceStatus::Warning,
            actions::WARNING,
            reason,
            chapter,
            Confidence::Medium,
        )
    }

    pub fn normal() -> Self {
        Self {
            status: MaintenanceStatus::Normal,
            action: actions::NORMAL.to_string(),
            reason: None,
            details: Some(NOMINAL_DETAILS.to_string()),
            ata_chapter: None,
            confidence: Some(Confidence::High),
            violations: Vec::new(),
        }
    }

    pub fn sensor_fault(details: String) -> Self {
        Self::failure(MaintenanceStatus::SensorFault, actions::SENSOR_FAULT, details)
    }

    pub fn data_error(details: String, violations: Vec<FieldViolation>) -> Self {
        Self {
            violations,
            ..Self::failure(MaintenanceStatus::DataError, actions::DATA_ERROR, details)
        }
    }

    pub fn system_error() -> Self {
        Self::failure(
            MaintenanceStatus::SystemError,
            actions::SYSTEM_ERROR,
            SYSTEM_ERROR_DETAILS.to_string(),
        )
    }

    pub const fn status(&self) -> MaintenanceStatus {
        self.status
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub const fn ata_chapter(&self) -> Option<AtaChapter> {
        self.ata_chapter
    }

    pub const fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

/// Multi-line report for terminals and chat front ends.
impl std::fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status:     {}", self.status)?;
        writeln!(f, "Action:     {}", self.action)?;
        if let Some(ref reason) = self.reason {
            writeln!(f, "Reason:     {reason}")?;
        }
        if let Some(ref details) = self.details {
            writeln!(f, "Details:    {details}")?;
        }
        if let Some(chapter) = self.ata_chapter {
            writeln!(f, "ATA:        {chapter}")?;
        }
        if let Some(confidence) = self.confidence {
            writeln!(f, "Confidence: {confidence}")?;
        }
        Ok(())
    }
}
