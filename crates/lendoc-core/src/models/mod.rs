//! Data models shared across the extraction pipeline.

pub mod config;
pub mod document;

pub use config::{DocumentConfig, LendocConfig, ModelConfig, Provider};
pub use document::{ExtractedFields, ModelResponse, ResultEnvelope};
