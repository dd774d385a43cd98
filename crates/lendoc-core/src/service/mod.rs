//! Model service seam and its Gemini implementation.

#[cfg(feature = "gemini")]
mod gemini;
pub mod payload;
pub mod response;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use payload::Payload;
pub use response::{parse_model_text, strip_code_fence};

use std::path::Path;

use crate::error::ModelServiceError;
use crate::models::document::ModelResponse;

/// Anything that can read a document and answer an extraction prompt.
///
/// Extraction calls are blocking. Implementations own their transport,
/// timeouts and retries; callers see only the final response or error.
pub trait ModelService: Send + Sync {
    /// Run `prompt` against the document at `file_path`.
    fn process_document(
        &self,
        file_path: &Path,
        prompt: &str,
    ) -> Result<ModelResponse, ModelServiceError>;
}

impl<F> ModelService for F
where
    F: Fn(&Path, &str) -> Result<ModelResponse, ModelServiceError> + Send + Sync,
{
    fn process_document(
        &self,
        file_path: &Path,
        prompt: &str,
    ) -> Result<ModelResponse, ModelServiceError> {
        self(file_path, prompt)
    }
}
