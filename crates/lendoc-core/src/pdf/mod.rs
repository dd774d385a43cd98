//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

#[cfg(test)]
pub(crate) use extractor::tests::blank_pdf;

use crate::error::ModelServiceError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, ModelServiceError>;
