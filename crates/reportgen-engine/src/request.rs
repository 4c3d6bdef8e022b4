use reportgen_core::models::request::GenerationRequest;

use crate::error::EngineError;

/// Decode a queue payload into a generation request.
///
/// Rejects payloads without a report type or team id before anything is
/// persisted.
pub fn parse(payload: &str) -> Result<GenerationRequest, EngineError> {
    let request: GenerationRequest = serde_json::from_str(payload)
        .map_err(|e| EngineError::InvalidRequest(format!("error decoding request: {e}")))?;

    if request.report_type.is_empty() {
        return Err(EngineError::InvalidRequest("missing report type".to_string()));
    }
    if request.team_info.id.is_empty() {
        return Err(EngineError::InvalidRequest("missing team id".to_string()));
    }

    Ok(request)
}
