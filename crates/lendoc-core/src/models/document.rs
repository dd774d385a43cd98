//! Model responses, normalized fields, and the result envelope.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the model service hands back for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Best-effort JSON parse of the model's reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Value>,

    /// The reply exactly as the model produced it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    /// Why `structured_data` is missing, when the reply was not JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelResponse {
    /// A reply that parsed into structured data.
    pub fn structured(data: Value, raw: impl Into<String>) -> Self {
        Self {
            structured_data: Some(data),
            raw_response: Some(raw.into()),
            error: None,
        }
    }

    /// A reply that could not be parsed.
    pub fn unparsed(raw: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            structured_data: None,
            raw_response: Some(raw.into()),
            error: Some(error.into()),
        }
    }

    /// The structured data as a JSON object, if it is one.
    pub fn structured_object(&self) -> Option<&Map<String, Value>> {
        self.structured_data.as_ref().and_then(Value::as_object)
    }
}

/// Schema-conformant field values for one document.
///
/// Every field of the document type's schema is present, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(Map<String, Value>);

impl ExtractedFields {
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Value of a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field names in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields and values in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten group fields into `group.field` pairs.
    pub fn flatten(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                Value::Object(inner) => {
                    for (sub, v) in inner {
                        out.push((format!("{}.{}", key, sub), v));
                    }
                }
                other => out.push((key.clone(), other)),
            }
        }
        out
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<ExtractedFields> for Value {
    fn from(fields: ExtractedFields) -> Self {
        Value::Object(fields.0)
    }
}

/// Uniform result of one extraction, whatever the document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    case_id: String,
    document_type: String,
    file_path: PathBuf,
    extracted_data: ExtractedFields,
    raw_response: String,
}

impl ResultEnvelope {
    pub fn new(
        case_id: impl Into<String>,
        document_type: impl Into<String>,
        file_path: impl Into<PathBuf>,
        extracted_data: ExtractedFields,
        raw_response: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            document_type: document_type.into(),
            file_path: file_path.into(),
            extracted_data,
            raw_response: raw_response.into(),
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Canonical registry key of the document type.
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn extracted_data(&self) -> &ExtractedFields {
        &self.extracted_data
    }

    /// Model text kept for auditing; empty when the service returned none.
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_envelope_serializes_expected_keys() {
        let mut map = Map::new();
        map.insert("name".to_string(), json!("Asha Rao"));
        let envelope = ResultEnvelope::new(
            "case-1",
            "kyc",
            "/tmp/id.pdf",
            ExtractedFields::from_map(map),
            "",
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "case_id": "case-1",
                "document_type": "kyc",
                "file_path": "/tmp/id.pdf",
                "extracted_data": {"name": "Asha Rao"},
                "raw_response": ""
            })
        );
    }

    #[test]
    fn test_model_response_missing_keys_deserialize() {
        let response: ModelResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, ModelResponse::default());
        assert!(response.structured_object().is_none());
    }

    #[test]
    fn test_structured_object_rejects_arrays() {
        let response = ModelResponse::structured(json!(["a", "b"]), "[\"a\",\"b\"]");
        assert!(response.structured_object().is_none());
    }

    #[test]
    fn test_flatten_groups() {
        let map = json!({
            "dpn": {"leadID": "L1", "borrowersSignatures": true},
            "note": ""
        });
        let fields = ExtractedFields::from_map(map.as_object().unwrap().clone());
        let flat: Vec<String> = fields.flatten().into_iter().map(|(k, _)| k).collect();
        assert_eq!(flat, vec!["dpn.leadID", "dpn.borrowersSignatures", "note"]);
    }
}
