//! Google Gemini backend (Generative Language API or Vertex AI).
//!
//! Documents are sent inline next to the extraction prompt and the model is
//! asked for a JSON reply. Credentials come from [`ModelConfig`]:
//! - `gemini_api` needs `api_key` (or `GEMINI_API_KEY`)
//! - `vertex` needs `access_token` (or `VERTEX_AI_ACCESS_TOKEN`)

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::payload::{self, Payload};
use super::response::parse_model_text;
use super::ModelService;
use crate::error::ModelServiceError;
use crate::models::config::{DocumentConfig, LendocConfig, ModelConfig, Provider};
use crate::models::document::ModelResponse;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
];

/// Gemini model service.
pub struct GeminiClient {
    model: ModelConfig,
    documents: DocumentConfig,
    http: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    /// Create a client from model and document settings.
    pub fn new(model: ModelConfig, documents: DocumentConfig) -> Result<Self, ModelServiceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(model.timeout_secs))
            .build()?;
        Ok(Self {
            model,
            documents,
            http,
        })
    }

    /// Create a client from the full configuration.
    pub fn from_config(config: &LendocConfig) -> Result<Self, ModelServiceError> {
        Self::new(config.model.clone(), config.documents.clone())
    }

    /// Whether credentials for the configured provider are present.
    pub fn is_available(&self) -> bool {
        match self.model.provider {
            Provider::GeminiApi => self.model.api_key.is_some(),
            Provider::Vertex => self.model.access_token.is_some(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model.model
    }

    /// Endpoint URL and optional bearer token for the configured provider.
    fn endpoint(&self) -> Result<(String, Option<&str>), ModelServiceError> {
        let m = &self.model;
        match m.provider {
            Provider::GeminiApi => {
                let key = m.api_key.as_deref().ok_or_else(|| {
                    ModelServiceError::MissingCredentials(
                        "GEMINI_API_KEY not set. Get an API key from https://ai.google.dev/"
                            .to_string(),
                    )
                })?;
                Ok((
                    format!(
                        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                        m.model, key
                    ),
                    None,
                ))
            }
            Provider::Vertex => {
                let token = m.access_token.as_deref().ok_or_else(|| {
                    ModelServiceError::MissingCredentials(
                        "VERTEX_AI_ACCESS_TOKEN not set (try `gcloud auth print-access-token`)"
                            .to_string(),
                    )
                })?;
                Ok((
                    format!(
                        "https://{loc}-aiplatform.googleapis.com/v1/projects/{project}/locations/{loc}/publishers/google/models/{model}:generateContent",
                        loc = m.location,
                        project = m.project_id,
                        model = m.model
                    ),
                    Some(token),
                ))
            }
        }
    }

    fn build_request(&self, prompt: &str, payload: Payload) -> GenerateRequest {
        let parts = match payload {
            Payload::Inline { mime_type, data } => vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type,
                        data: STANDARD.encode(data),
                    },
                },
            ],
            Payload::Text(text) => vec![Part::Text {
                text: format!("{}\n\nDocument text:\n{}", prompt, text),
            }],
        };

        GenerateRequest {
            contents: vec![Content { role: "user", parts }],
            generation_config: GenerationConfig {
                temperature: self.model.temperature,
                top_p: self.model.top_p,
                max_output_tokens: self.model.max_output_tokens,
                response_mime_type: "application/json",
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "OFF",
                })
                .collect(),
        }
    }
}

/// Concatenated text of the first candidate.
fn candidate_text(response: GenerateResponse) -> Result<String, ModelServiceError> {
    if let Some(error) = response.error {
        return Err(ModelServiceError::Rejected(error.message));
    }

    let text: String = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelServiceError::EmptyResponse);
    }
    Ok(text)
}

impl ModelService for GeminiClient {
    fn process_document(
        &self,
        file_path: &Path,
        prompt: &str,
    ) -> Result<ModelResponse, ModelServiceError> {
        let (url, bearer) = self.endpoint()?;
        let payload = payload::prepare(file_path, &self.documents)?;
        let request = self.build_request(prompt, payload);

        debug!(
            "Sending {} to {} ({} prompt chars)",
            file_path.display(),
            self.model.model,
            prompt.len()
        );

        let mut builder = self.http.post(&url).json(&request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelServiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = candidate_text(response.json()?)?;
        info!("Model response received for {}", file_path.display());
        Ok(parse_model_text(&text))
    }
}
