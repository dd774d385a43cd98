//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExtractError, Result};

/// Main configuration for lendoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LendocConfig {
    /// Model service configuration.
    pub model: ModelConfig,

    /// Document preparation configuration.
    pub documents: DocumentConfig,
}

/// Which Gemini endpoint to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Generative Language API, authenticated with an API key.
    GeminiApi,
    /// Vertex AI, authenticated with an OAuth access token.
    Vertex,
}

/// Model service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Endpoint flavour.
    pub provider: Provider,

    /// Google Cloud project ID (Vertex only).
    pub project_id: String,

    /// Google Cloud region (Vertex only).
    pub location: String,

    /// Model name.
    pub model: String,

    /// API key for the Generative Language API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Bearer token for Vertex AI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Sampling temperature. Kept low for deterministic output.
    pub temperature: f32,

    /// Nucleus sampling threshold.
    pub top_p: f32,

    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Vertex,
            project_id: "cifcl-poc-ai".to_string(),
            location: "asia-south1".to_string(),
            model: "gemini-1.5-pro-002".to_string(),
            api_key: None,
            access_token: None,
            temperature: 0.1,
            top_p: 0.95,
            max_output_tokens: 8192,
            timeout_secs: 120,
        }
    }
}

/// Document preparation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Send only the first page of multi-page PDFs.
    pub first_page_only: bool,

    /// File extensions sent to the model as images.
    pub image_extensions: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            first_page_only: true,
            image_extensions: ["jpg", "jpeg", "png", "bmp", "gif", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl LendocConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ExtractError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ExtractError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(project) = lookup("VERTEX_AI_PROJECT_ID") {
            self.model.project_id = project;
        }
        if let Some(location) = lookup("VERTEX_AI_LOCATION") {
            self.model.location = location;
        }
        if let Some(model) = lookup("VERTEX_AI_MODEL") {
            self.model.model = model;
        }
        if let Some(token) = lookup("VERTEX_AI_ACCESS_TOKEN") {
            self.model.access_token = Some(token);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.model.api_key = Some(key);
            // An API key alone means the caller wants the public endpoint.
            if self.model.access_token.is_none() {
                self.model.provider = Provider::GeminiApi;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = LendocConfig::default();
        assert_eq!(config.model.provider, Provider::Vertex);
        assert_eq!(config.model.location, "asia-south1");
        assert_eq!(config.model.max_output_tokens, 8192);
        assert!(config.documents.first_page_only);
        assert!(config.documents.image_extensions.contains(&"webp".to_string()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: LendocConfig =
            serde_json::from_str(r#"{"model": {"model": "gemini-2.0-flash"}}"#).unwrap();
        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.model.project_id, "cifcl-poc-ai");
        assert!(config.documents.first_page_only);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = LendocConfig::default();
        config.model.provider = Provider::GeminiApi;
        config.documents.first_page_only = false;
        config.save(&path).unwrap();

        let loaded = LendocConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model.provider, Provider::GeminiApi);
        assert!(!loaded.documents.first_page_only);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            LendocConfig::from_file(&path),
            Err(ExtractError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VERTEX_AI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = LendocConfig::default();
        config.apply_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.model.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model.provider, Provider::GeminiApi);
        assert_eq!(config.model.location, "asia-south1");
    }

    #[test]
    fn test_access_token_keeps_vertex() {
        let mut config = LendocConfig::default();
        config.apply_vars(|key| match key {
            "VERTEX_AI_ACCESS_TOKEN" => Some("token".to_string()),
            "GEMINI_API_KEY" => Some("secret".to_string()),
            _ => None,
        });
        assert_eq!(config.model.provider, Provider::Vertex);
    }
}
