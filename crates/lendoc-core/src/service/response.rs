//! Parsing model replies into [`ModelResponse`]s.

use tracing::{debug, warn};

use crate::models::document::ModelResponse;

/// Strip a surrounding markdown code fence, if any.
///
/// Models asked for bare JSON still sometimes wrap it in ```` ```json ````.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Build a response from the model's raw text.
///
/// Unparseable text is not an error: the raw text is kept and
/// `structured_data` is left empty so every field falls back to its default.
pub fn parse_model_text(text: &str) -> ModelResponse {
    let body = strip_code_fence(text);
    match serde_json::from_str(body) {
        Ok(value) => {
            debug!("Parsed {} bytes of model JSON", body.len());
            ModelResponse::structured(value, text)
        }
        Err(e) => {
            warn!("Error parsing JSON response: {}", e);
            ModelResponse::unparsed(text, format!("Failed to parse JSON: {}", e))
        }
    }
}
