use serde_json::Value;

use crate::error::MalformedEnvelope;

/// Strip the SNS envelope around a queue message body and return the
/// published payload.
///
/// The body must be a JSON object whose `Message` field is a string.
pub fn unwrap(raw: &str) -> Result<String, MalformedEnvelope> {
    let malformed = |reason: String| MalformedEnvelope { reason };

    let envelope = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(envelope)) => envelope,
        Ok(_) => return Err(malformed("body is not a JSON object".to_string())),
        Err(e) => return Err(malformed(e.to_string())),
    };

    match envelope.get("Message") {
        Some(Value::String(message)) => Ok(message.clone()),
        Some(_) => Err(malformed("Message field is not a string".to_string())),
        None => Err(malformed("missing Message field".to_string())),
    }
}
