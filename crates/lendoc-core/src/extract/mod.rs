//! Document field extraction.

mod extractor;
mod registry;

pub use extractor::DocumentExtractor;
pub use registry::{normalize_key, ExtractorRegistry};

use std::path::Path;

use crate::error::Result;
use crate::models::document::ResultEnvelope;
use crate::service::ModelService;

/// Extract one document using the built-in registry.
///
/// Resolves `document_type` (label or key) and runs that type's extractor.
pub fn extract_document<S>(
    service: &S,
    case_id: &str,
    document_type: &str,
    file_path: impl AsRef<Path>,
) -> Result<ResultEnvelope>
where
    S: ModelService + ?Sized,
{
    ExtractorRegistry::builtin()
        .get_extractor(document_type)?
        .extract_details(case_id, file_path.as_ref(), service)
}
