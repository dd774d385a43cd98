//! Document type registry.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use tracing::debug;

use super::DocumentExtractor;
use crate::error::{ExtractError, Result};
use crate::schema::{DocumentSchema, BUILTIN_SCHEMAS};

lazy_static! {
    static ref BUILTIN: ExtractorRegistry = ExtractorRegistry::new(BUILTIN_SCHEMAS);
}

/// Read-only mapping from document type key to extractor.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<&'static str, DocumentExtractor>,
}

impl ExtractorRegistry {
    /// Build a registry over `schemas`. Later duplicates replace earlier ones.
    pub fn new(schemas: &'static [DocumentSchema]) -> Self {
        let extractors = schemas
            .iter()
            .map(|schema| (schema.key, DocumentExtractor::new(schema)))
            .collect();
        Self { extractors }
    }

    /// The process-wide registry of built-in document types.
    pub fn builtin() -> &'static ExtractorRegistry {
        &BUILTIN
    }

    /// Look up the extractor for a document type.
    ///
    /// Accepts labels ("Legal Report") as well as keys ("legal_report").
    pub fn get_extractor(&self, document_type: &str) -> Result<&DocumentExtractor> {
        let key = normalize_key(document_type);
        debug!("Resolving document type {:?} as {}", document_type, key);
        self.extractors
            .get(key.as_str())
            .ok_or(ExtractError::UnknownDocumentType(key))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.extractors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentExtractor> {
        self.extractors.values()
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

/// Lower-case and replace spaces with underscores.
pub fn normalize_key(document_type: &str) -> String {
    document_type.to_lowercase().replace(' ', "_")
}
