//! Generative-AI provider abstraction.
//!
//! Defines the [`GenerativeModel`] trait and its implementations:
//! - **[`DisabledModel`]**: always fails with a configuration error; used when
//!   `ai.provider = "disabled"`.
//! - **[`GeminiClient`]**: calls the Gemini `generateContent` REST endpoint
//!   with a JSON response schema and sampling temperature.
//!
//! # Provider Selection
//!
//! Use [`create_model`] to instantiate the configured provider:
//!
//! ```rust
//! # use prospan_lib::config::AiConfig;
//! # use prospan_lib::genai::create_model;
//! let mut config = AiConfig::default();
//! config.provider = "disabled".to_string();
//! let model = create_model(&config).unwrap();
//! assert_eq!(model.model_name(), "disabled");
//! ```
//!
//! # Errors
//!
//! [`AiError`] separates configuration errors (missing credential, disabled
//! provider), which callers propagate, from provider, transport and parse
//! errors, which the extractor and search turn into fallback values.
//! There is no retry: one call, one attempt.

mod gemini;
#[cfg(test)]
pub(crate) mod testing;

pub use gemini::GeminiClient;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::AiConfig;

/// One generation call: prompt text plus optional output constraints.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub prompt: String,
    /// JSON schema hint for the response body.
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("API key is missing. Please set the {0} environment variable.")]
    MissingApiKey(String),
    #[error("AI provider is disabled (ai.provider = \"disabled\")")]
    Disabled,
    #[error("AI request failed: {0}")]
    Transport(String),
    #[error("AI provider error {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("AI response could not be decoded: {0}")]
    Malformed(String),
}

impl AiError {
    /// Configuration errors are surfaced to the caller; everything else is
    /// absorbed into a fallback value.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AiError::MissingApiKey(_) | AiError::Disabled)
    }
}

/// A text-in, JSON-text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier (e.g. `"gemini-2.5-flash"`).
    fn model_name(&self) -> &str;

    /// Run one generation. `Ok(None)` means the provider returned no text.
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, AiError>;
}

/// A model that refuses every call.
pub struct DisabledModel;

#[async_trait]
impl GenerativeModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<Option<String>, AiError> {
        Err(AiError::Disabled)
    }
}

/// Build the model selected by `config.provider`.
///
/// Does not check the API key; that happens on each call.
pub fn create_model(config: &AiConfig) -> Result<Arc<dyn GenerativeModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledModel)),
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        other => bail!("Unknown AI provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_model_is_a_configuration_error() {
        let err = DisabledModel
            .generate(&GenerateRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn missing_key_message_names_the_variable() {
        let err = AiError::MissingApiKey("API_KEY".into());
        assert!(err.is_configuration());
        assert!(err.to_string().contains("API_KEY environment variable"));
    }

    #[test]
    fn provider_errors_are_not_configuration() {
        assert!(!AiError::Transport("reset".into()).is_configuration());
        assert!(!AiError::Provider {
            status: 500,
            body: String::new()
        }
        .is_configuration());
        assert!(!AiError::Malformed("x".into()).is_configuration());
    }

    #[test]
    fn create_model_does_not_require_key() {
        let mut config = AiConfig::default();
        config.api_key_env = "PROSPAN_TEST_UNSET_KEY_FOR_CREATE".into();
        let model = create_model(&config).unwrap();
        assert_eq!(model.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn request_builder() {
        let req = GenerateRequest::new("p")
            .with_schema(serde_json::json!({"type": "OBJECT"}))
            .with_temperature(Some(0.1));
        assert_eq!(req.prompt, "p");
        assert!(req.response_schema.is_some());
        assert_eq!(req.temperature, Some(0.1));
    }
}
