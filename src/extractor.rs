//! Structured metadata extraction from raw document text.
//!
//! One model call per document. Whatever goes wrong after the request is
//! built (transport, provider status, empty or malformed payload, missing
//! title or summary) becomes [`ExtractedMetadata::extraction_fallback`].
//! Only configuration errors reach the caller.

use std::path::Path;

use prospan_core::models::ExtractedMetadata;
use prospan_core::prompt::{extraction_prompt, extraction_schema};
use prospan_core::response::parse_metadata;

use crate::config::{AssistantConfig, Config};
use crate::extract::read_source_text;
use crate::genai::{create_model, AiError, GenerateRequest, GenerativeModel};

pub async fn extract_metadata(
    model: &dyn GenerativeModel,
    raw_text: &str,
    settings: &AssistantConfig,
) -> Result<ExtractedMetadata, AiError> {
    let request = GenerateRequest::new(extraction_prompt(
        raw_text,
        &settings.language,
        settings.max_extract_chars,
    ))
    .with_schema(extraction_schema())
    .with_temperature(Some(settings.extraction_temperature));

    let payload = match model.generate(&request).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            tracing::warn!(model = model.model_name(), "extraction returned no text");
            return Ok(ExtractedMetadata::extraction_fallback());
        }
        Err(e) if e.is_configuration() => {
            tracing::error!(error = %e, "metadata extraction unavailable");
            return Err(e);
        }
        Err(e) => {
            tracing::error!(error = %e, "metadata extraction failed");
            return Ok(ExtractedMetadata::extraction_fallback());
        }
    };

    match parse_metadata(&payload) {
        Ok(metadata) => Ok(metadata),
        Err(e) => {
            tracing::warn!(error = %e, "discarding extraction payload");
            Ok(ExtractedMetadata::extraction_fallback())
        }
    }
}

/// `prospan extract`: print the metadata extracted from one file as JSON.
pub async fn run_extract(config: &Config, path: &Path) -> anyhow::Result<()> {
    let text = read_source_text(path)?;
    let model = create_model(&config.ai)?;
    let metadata = extract_metadata(model.as_ref(), &text, &config.assistant).await?;
    if metadata.is_extraction_fallback() {
        eprintln!("Warning: metadata could not be extracted from {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::testing::ScriptedModel;

    fn settings() -> AssistantConfig {
        AssistantConfig {
            max_extract_chars: 10,
            ..AssistantConfig::default()
        }
    }

    #[tokio::test]
    async fn valid_payload_is_returned() {
        let model = ScriptedModel::new().reply(
            r#"{"title":"Study A","summary":"About A.","results":["r1","r2"]}"#,
        );
        let meta = extract_metadata(&model, "raw", &settings()).await.unwrap();
        assert_eq!(meta.title, "Study A");
        assert_eq!(meta.results.as_deref(), Some(&["r1".to_string(), "r2".to_string()][..]));
        assert!(!meta.is_extraction_fallback());
    }

    #[tokio::test]
    async fn request_carries_truncated_text_schema_and_low_temperature() {
        let model = ScriptedModel::new().reply(r#"{"title":"T","summary":"S"}"#);
        extract_metadata(&model, "0123456789ABCDEF", &settings())
            .await
            .unwrap();
        let req = &model.requests()[0];
        assert!(req.prompt.contains("0123456789"));
        assert!(!req.prompt.contains("ABCDEF"));
        assert!(req.prompt.contains("VIETNAMESE"));
        assert_eq!(req.temperature, Some(0.1));
        assert_eq!(req.response_schema.as_ref().unwrap()["required"][0], "title");
    }

    #[tokio::test]
    async fn transport_failure_yields_fallback() {
        let model = ScriptedModel::new().fail(AiError::Transport("connection reset".into()));
        let meta = extract_metadata(&model, "raw", &settings()).await.unwrap();
        assert!(meta.is_extraction_fallback());
        assert_eq!(meta.title, "Unidentified document");
    }

    #[tokio::test]
    async fn provider_error_yields_fallback() {
        let model = ScriptedModel::new().fail(AiError::Provider {
            status: 500,
            body: "oops".into(),
        });
        let meta = extract_metadata(&model, "raw", &settings()).await.unwrap();
        assert!(meta.is_extraction_fallback());
    }

    #[tokio::test]
    async fn empty_and_malformed_payloads_yield_fallback() {
        for model in [
            ScriptedModel::new().empty(),
            ScriptedModel::new().reply("not json"),
            ScriptedModel::new().reply(r#"{"title":"Only a title"}"#),
        ] {
            let meta = extract_metadata(&model, "raw", &settings()).await.unwrap();
            assert!(meta.is_extraction_fallback());
        }
    }

    #[tokio::test]
    async fn missing_key_is_returned() {
        let model = ScriptedModel::new().fail(AiError::MissingApiKey("API_KEY".into()));
        let err = extract_metadata(&model, "raw", &settings()).await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey(_)));
    }
}
