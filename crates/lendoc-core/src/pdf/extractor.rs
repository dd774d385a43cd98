//! PDF page selection using lopdf.

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::ModelServiceError;

/// Loaded PDF document, trimmed to the pages that should reach the model.
pub struct PdfExtractor {
    document: Option<Document>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self { document: None }
    }

    /// Load a PDF from bytes.
    ///
    /// Encrypted and page-less documents are rejected here so the model is
    /// never asked to read them.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let document = Document::load_mem(data)
            .map_err(|e| ModelServiceError::Pdf(format!("failed to parse PDF: {}", e)))?;

        if document.is_encrypted() {
            return Err(ModelServiceError::Pdf("PDF is encrypted".to_string()));
        }

        let pages = document.get_pages().len();
        if pages == 0 {
            return Err(ModelServiceError::Pdf(
                "the PDF document contains no pages".to_string(),
            ));
        }

        debug!("Loaded PDF with {} pages", pages);
        self.document = Some(document);
        Ok(())
    }

    /// Get the number of pages in the PDF.
    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|d| d.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Drop every page after the first.
    pub fn keep_first_page(&mut self) -> Result<()> {
        let doc = self.loaded_mut()?;

        let extra: Vec<u32> = doc.get_pages().keys().copied().filter(|&n| n > 1).collect();
        if !extra.is_empty() {
            debug!("Removing {} trailing pages", extra.len());
            doc.delete_pages(&extra);
            doc.prune_objects();
        }
        Ok(())
    }

    /// Serialize the current document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let doc = self.loaded_mut()?;
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| ModelServiceError::Pdf(format!("failed to write PDF: {}", e)))?;
        Ok(out)
    }

    fn loaded_mut(&mut self) -> Result<&mut Document> {
        self.document
            .as_mut()
            .ok_or_else(|| ModelServiceError::Pdf("no document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}
