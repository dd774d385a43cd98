//! Schema-driven document extractor.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ExtractError, Result};
use crate::models::document::{ExtractedFields, ModelResponse, ResultEnvelope};
use crate::schema::{self, DocumentSchema};
use crate::service::ModelService;

/// Extractor for one document type.
///
/// Holds the type's schema and the prompt rendered from it. All document
/// types share this implementation; only the schema differs.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    schema: &'static DocumentSchema,
    prompt: String,
}

impl DocumentExtractor {
    pub fn new(schema: &'static DocumentSchema) -> Self {
        Self {
            schema,
            prompt: schema::render_prompt(schema),
        }
    }

    /// Canonical document type key.
    pub fn key(&self) -> &'static str {
        self.schema.key
    }

    pub fn schema(&self) -> &'static DocumentSchema {
        self.schema
    }

    pub fn get_extraction_prompt(&self) -> &str {
        &self.prompt
    }

    /// Map a model response onto the schema.
    ///
    /// Always returns every schema field: values the model supplied pass
    /// through as-is, anything missing gets the field's default.
    pub fn extract_fields(&self, response: Option<&ModelResponse>) -> ExtractedFields {
        let source = response.and_then(ModelResponse::structured_object);
        if source.is_none() {
            debug!("No structured data for {}, using defaults", self.schema.key);
        }
        ExtractedFields::from_map(schema::resolve_all(self.schema.fields, source))
    }

    /// Run the model on `file_path` and normalize the result.
    pub fn extract_details<S>(
        &self,
        case_id: &str,
        file_path: &Path,
        service: &S,
    ) -> Result<ResultEnvelope>
    where
        S: ModelService + ?Sized,
    {
        if !file_path.exists() {
            return Err(ExtractError::FileNotFound(file_path.to_path_buf()));
        }

        let start = Instant::now();
        let response = service.process_document(file_path, self.get_extraction_prompt())?;
        let extracted = self.extract_fields(Some(&response));

        info!(
            "Extracted {} ({}) for case {} in {}ms",
            file_path.display(),
            self.schema.key,
            case_id,
            start.elapsed().as_millis()
        );

        Ok(ResultEnvelope::new(
            case_id,
            self.schema.key,
            file_path,
            extracted,
            response.raw_response.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelServiceError;
    use crate::schema::catalog::{AGREEMENT, LEGAL_REPORT};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_partial_structured_data() {
        let extractor = DocumentExtractor::new(&LEGAL_REPORT);
        let response = ModelResponse::structured(
            json!({"leadID": "LD-9", "legalVendorSignature": true, "notes": "x"}),
            "",
        );

        let fields = extractor.extract_fields(Some(&response));
        assert_eq!(
            Value::from(fields),
            json!({
                "leadID": "LD-9",
                "customerName": "",
                "propertyOwnerName": "",
                "propertyAddress": "",
                "boundaries": "",
                "legalVendorSignature": true
            })
        );
    }

    #[test]
    fn test_unparsed_response_defaults() {
        let extractor = DocumentExtractor::new(&AGREEMENT);
        let response = ModelResponse::unparsed("garbage", "Failed to parse JSON");

        let fields = extractor.extract_fields(Some(&response));
        assert_eq!(
            Value::from(fields),
            json!({
                "dpn": {
                    "borrowersSignatures": false,
                    "leadID": "",
                    "customerName": "",
                    "loanAmount": ""
                },
                "schedulePage": {
                    "borrowersSignature": false,
                    "cholaAuthorizedSignature": false
                }
            })
        );
    }

    #[test]
    fn test_agreement_partial_group() {
        let extractor = DocumentExtractor::new(&AGREEMENT);
        let response = ModelResponse::structured(
            json!({"dpn": {"leadID": "L-1", "loanAmount": 500000}}),
            "",
        );

        let fields = extractor.extract_fields(Some(&response));
        assert_eq!(fields.get("dpn").unwrap()["loanAmount"], json!(500000));
        assert_eq!(fields.get("dpn").unwrap()["borrowersSignatures"], json!(false));
        assert_eq!(
            fields.get("schedulePage").unwrap(),
            &json!({"borrowersSignature": false, "cholaAuthorizedSignature": false})
        );
    }

    #[test]
    fn test_missing_file_skips_service() {
        let calls = AtomicUsize::new(0);
        let service = |_: &Path, _: &str| -> std::result::Result<ModelResponse, ModelServiceError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(ModelResponse::default())
        };

        let extractor = DocumentExtractor::new(&LEGAL_REPORT);
        let err = extractor
            .extract_details("case-9", Path::new("/nonexistent/report.pdf"), &service)
            .unwrap_err();

        assert!(matches!(err, ExtractError::FileNotFound(ref p) if p == Path::new("/nonexistent/report.pdf")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_service_receives_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let extractor = DocumentExtractor::new(&LEGAL_REPORT);
        let expected_prompt = extractor.get_extraction_prompt().to_string();
        let service = move |_: &Path, prompt: &str| -> std::result::Result<ModelResponse, ModelServiceError> {
            assert_eq!(prompt, expected_prompt);
            Ok(ModelResponse::structured(json!({}), "{}"))
        };

        let envelope = extractor.extract_details("case-3", &path, &service).unwrap();
        assert_eq!(envelope.raw_response(), "{}");
        assert_eq!(envelope.document_type(), "legal_report");
        assert_eq!(envelope.file_path(), path.as_path());
    }

    #[test]
    fn test_service_error_propagates_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let service = |_: &Path, _: &str| -> std::result::Result<ModelResponse, ModelServiceError> {
            Err(ModelServiceError::Api {
                status: 429,
                body: "quota".to_string(),
            })
        };

        let extractor = DocumentExtractor::new(&LEGAL_REPORT);
        let err = extractor.extract_details("case-4", &path, &service).unwrap_err();
        assert_eq!(err.to_string(), "model API error (429): quota");
        assert!(matches!(
            err,
            ExtractError::ModelService(ModelServiceError::Api { status: 429, .. })
        ));
    }
}
