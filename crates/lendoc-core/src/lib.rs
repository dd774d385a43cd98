//! Core library for lending document field extraction.
//!
//! This crate provides:
//! - Declarative extraction schemas for KYC, sanction letters, legal reports
//!   and the other documents of a loan file
//! - A read-only registry resolving document type labels to extractors
//! - Normalization of model replies into a fixed, fully-populated schema
//! - A Gemini model service (feature `gemini`) with PDF and DOCX preparation

pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod schema;
pub mod service;

pub use error::{ExtractError, ModelServiceError, Result};
pub use extract::{extract_document, normalize_key, DocumentExtractor, ExtractorRegistry};
pub use models::config::LendocConfig;
pub use models::document::{ExtractedFields, ModelResponse, ResultEnvelope};
pub use schema::{DocumentSchema, FieldKind, FieldSpec};
pub use service::ModelService;

#[cfg(feature = "gemini")]
pub use service::GeminiClient;
