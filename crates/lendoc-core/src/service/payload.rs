//! Turning a document on disk into something the model can read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::ModelServiceError;
use crate::models::config::DocumentConfig;
use crate::pdf::PdfExtractor;

type Result<T> = std::result::Result<T, ModelServiceError>;

/// Document content ready to be attached to a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Binary content sent inline with its MIME type.
    Inline { mime_type: String, data: Vec<u8> },
    /// Plain text pulled out of the document.
    Text(String),
}

impl Payload {
    /// Short description for logs.
    pub fn kind(&self) -> &str {
        match self {
            Payload::Inline { mime_type, .. } => mime_type,
            Payload::Text(_) => "text/plain",
        }
    }
}

/// Read `path` and convert it according to its extension.
pub fn prepare(path: &Path, config: &DocumentConfig) -> Result<Payload> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let payload = if config.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
        Payload::Inline {
            mime_type: image_mime_type(&extension),
            data: std::fs::read(path)?,
        }
    } else {
        match extension.as_str() {
            "pdf" => prepare_pdf(path, config.first_page_only)?,
            "doc" | "docx" => Payload::Text(docx_text(path)?),
            _ => return Err(ModelServiceError::UnsupportedFormat(format!(".{}", extension))),
        }
    };

    debug!("Prepared {} payload from {}", payload.kind(), path.display());
    Ok(payload)
}

fn image_mime_type(extension: &str) -> String {
    match extension {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        other => format!("image/{}", other),
    }
}

fn prepare_pdf(path: &Path, first_page_only: bool) -> Result<Payload> {
    let data = std::fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    let data = if first_page_only && extractor.page_count() > 1 {
        extractor.keep_first_page()?;
        extractor.to_bytes()?
    } else {
        data
    };

    Ok(Payload::Inline {
        mime_type: "application/pdf".to_string(),
        data,
    })
}

/// Paragraph text of a Word document, one paragraph per line.
pub fn docx_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| ModelServiceError::Docx(format!("failed to open archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ModelServiceError::Docx(format!("missing document body: {}", e)))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => text.push('\t'),
            Ok(Event::Text(t)) if in_run => {
                let run = t
                    .unescape()
                    .map_err(|e| ModelServiceError::Docx(e.to_string()))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ModelServiceError::Docx(e.to_string())),
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}
