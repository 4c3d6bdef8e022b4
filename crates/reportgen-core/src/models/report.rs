use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::artifact::Artifact;
use super::request::TypedRequest;

/// A generated (or generating) report. One row per natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Empty until the repository persists the report for the first time.
    #[serde(default)]
    pub id: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub files: Vec<FileInfo>,
    #[serde(default)]
    pub notification: Notification,
    #[serde(default)]
    pub delivered_to: Vec<String>,
    #[serde(default)]
    pub created_at: Option<jiff::Timestamp>,
    #[serde(default)]
    pub updated_at: Option<jiff::Timestamp>,
    pub details: ReportDetails,
}

impl Report {
    /// A fresh, unpersisted report in `GENERATING` status.
    pub fn generating(details: ReportDetails) -> Self {
        Self {
            id: String::new(),
            status: ReportStatus::Generating,
            files: Vec::new(),
            notification: Notification::default(),
            delivered_to: Vec::new(),
            created_at: None,
            updated_at: None,
            details,
        }
    }

    /// Build the initial report for a typed request.
    pub fn for_request(request: &TypedRequest) -> Self {
        let details = match request {
            TypedRequest::Scan(scan) => ReportDetails::Scan(ScanDetails {
                scan_id: scan.scan_id.clone(),
                program_name: scan.program_name.clone(),
                report_url: None,
                report_json_url: None,
                risk: None,
            }),
            TypedRequest::LiveReport(live) => ReportDetails::LiveReport(LiveReportDetails {
                team_id: live.team_id.clone(),
                date_from: live.date_from.clone(),
                date_to: live.date_to.clone(),
            }),
        };
        Self::generating(details)
    }

    pub fn report_type(&self) -> ReportType {
        self.details.report_type()
    }

    pub fn natural_key(&self) -> String {
        self.details.natural_key()
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Copy the generator output onto the report.
    ///
    /// Type-specific artifact metadata is only kept by the report types that
    /// carry it (scan reports keep URLs and risk; live reports ignore them).
    pub fn apply_artifact(&mut self, artifact: &Artifact, recipients: &[String]) {
        self.files = artifact.files.clone();
        self.notification = Notification {
            subject: artifact.email_subject.clone(),
            body: artifact.email_body.clone(),
            format: artifact.format,
        };
        self.delivered_to = recipients.to_vec();

        if let ReportDetails::Scan(scan) = &mut self.details {
            scan.report_url = artifact.report_url.clone();
            scan.report_json_url = artifact.report_json_url.clone();
            scan.risk = artifact.risk;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Generating,
    Finished,
    Failed,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Finished | ReportStatus::Failed)
    }

    /// Whether `Finish` may move a report from `self` to `next`.
    ///
    /// Re-applying the current status is always allowed so finalization stays
    /// idempotent under at-least-once delivery.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        self == next || (self == ReportStatus::Generating && next.is_terminal())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Generating => "GENERATING",
            ReportStatus::Finished => "FINISHED",
            ReportStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report type tag as it appears in generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReportType {
    #[serde(rename = "scan")]
    Scan,
    #[serde(rename = "livereport")]
    LiveReport,
}

impl ReportType {
    pub const ALL: [ReportType; 2] = [ReportType::Scan, ReportType::LiveReport];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Scan => "scan",
            ReportType::LiveReport => "livereport",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(ReportType::Scan),
            "livereport" => Ok(ReportType::LiveReport),
            other => Err(CoreError::UnknownReportType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReportDetails {
    #[serde(rename = "scan")]
    Scan(ScanDetails),
    #[serde(rename = "livereport")]
    LiveReport(LiveReportDetails),
}

impl ReportDetails {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportDetails::Scan(_) => ReportType::Scan,
            ReportDetails::LiveReport(_) => ReportType::LiveReport,
        }
    }

    /// Business identifier used to deduplicate rows, unique per type.
    ///
    /// Components are escaped so distinct field values never produce the
    /// same key.
    pub fn natural_key(&self) -> String {
        match self {
            ReportDetails::Scan(scan) => escape_key_component(&scan.scan_id),
            ReportDetails::LiveReport(live) => format!(
                "{}/{}_{}",
                escape_key_component(&live.team_id),
                escape_key_component(&live.date_from),
                escape_key_component(&live.date_to)
            ),
        }
    }
}

/// Percent-encode the key separators (`/`, `_`) and the escape character.
fn escape_key_component(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '_' => escaped.push_str("%5F"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDetails {
    pub scan_id: String,
    pub program_name: String,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(default)]
    pub report_json_url: Option<String>,
    #[serde(default)]
    pub risk: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReportDetails {
    pub team_id: String,
    pub date_from: String,
    pub date_to: String,
}

/// A local report file and its upload destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub local_path: PathBuf,
    pub dest_bucket: String,
    pub dest_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub format: NotificationFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationFormat {
    #[default]
    Html,
    Text,
}
