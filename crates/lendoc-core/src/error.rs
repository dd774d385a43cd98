//! Error types for the lendoc-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the lendoc library.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No extractor is registered for the (normalized) document type.
    #[error("no extractor available for document type: {0}")]
    UnknownDocumentType(String),

    /// The document to extract does not exist on disk.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Failure raised by the model service, passed through unchanged.
    #[error(transparent)]
    ModelService(#[from] ModelServiceError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while preparing a document for, or talking to, the model service.
#[derive(Error, Debug)]
pub enum ModelServiceError {
    /// No API key or access token is configured for the selected provider.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// The file extension is not one the service can send.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The PDF could not be read or has no pages.
    #[error("error processing PDF: {0}")]
    Pdf(String),

    /// The Word document could not be read.
    #[error("error processing DOCX: {0}")]
    Docx(String),

    /// Transport-level failure.
    #[cfg(feature = "gemini")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered successfully but the body carried an error object.
    #[error("model rejected the request: {0}")]
    Rejected(String),

    /// The API answered but produced no candidate text.
    #[error("model returned no candidates")]
    EmptyResponse,

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the lendoc library.
pub type Result<T> = std::result::Result<T, ExtractError>;
