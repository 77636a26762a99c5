//! JSON parsing helpers for AI backend responses
//!
//! Completion models often wrap their JSON payload in extra prose; these
//! helpers extract the first JSON object and parse it strictly.

use crate::error::{Error, Result};

use super::types::RawClassification;

/// Truncate a raw model reply for inclusion in an error message.
fn truncate(s: &str) -> String {
    if s.len() > 200 {
        format!("{}...", &s[..200])
    } else {
        s.to_string()
    }
}

/// Parse a classification reply from the model response text.
///
/// Failures are `MalformedResult`: the reply either contained no JSON object
/// or the object did not deserialize.
pub fn parse_classification_reply(response: &str) -> Result<RawClassification> {
    let response = response.trim();

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            serde_json::from_str(json_str).map_err(|err| {
                Error::MalformedResult(format!(
                    "invalid JSON from completion service: {} | Raw: {}",
                    err,
                    truncate(json_str)
                ))
            })
        }
        _ => Err(Error::MalformedResult(format!(
            "no JSON found in completion response | Raw: {}",
            truncate(response)
        ))),
    }
}
