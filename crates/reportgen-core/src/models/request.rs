use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::report::ReportType;
use super::team::TeamInfo;

/// A report generation job, as published to the queue.
///
/// ```json
/// { "type": "scan", "team_info": { "id": "..", "name": "..", "recipients": [] },
///   "data": { .. }, "auto_send": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(rename = "type", default)]
    pub report_type: String,
    #[serde(default)]
    pub team_info: TeamInfo,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub auto_send: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub scan_id: String,
    #[serde(default)]
    pub program_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveReportRequest {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
}

/// The type-specific part of a generation request, decoded and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TypedRequest {
    Scan(ScanRequest),
    LiveReport(LiveReportRequest),
}

impl TypedRequest {
    /// Decode the opaque `data` payload of a request for the given type.
    pub fn decode(report_type: ReportType, data: &serde_json::Value) -> Result<Self, CoreError> {
        match report_type {
            ReportType::Scan => {
                let req: ScanRequest = serde_json::from_value(data.clone())?;
                require("scan_id", &req.scan_id)?;
                require("program_name", &req.program_name)?;
                Ok(TypedRequest::Scan(req))
            }
            ReportType::LiveReport => {
                let req: LiveReportRequest = serde_json::from_value(data.clone())?;
                require("team_id", &req.team_id)?;
                require("date_from", &req.date_from)?;
                require("date_to", &req.date_to)?;
                Ok(TypedRequest::LiveReport(req))
            }
        }
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            TypedRequest::Scan(_) => ReportType::Scan,
            TypedRequest::LiveReport(_) => ReportType::LiveReport,
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(())
}
