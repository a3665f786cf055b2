use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AiError, GenerateRequest, GenerativeModel};
use crate::config::AiConfig;

/// Client for the Gemini `generateContent` endpoint.
///
/// The API key is read from the configured environment variable on every
/// call, so a missing key fails the call rather than startup.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key_env: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            client: builder.build()?,
        })
    }

    fn api_key(&self) -> Result<String, AiError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(self.api_key_env.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenated text of the first candidate, `None` when there is none.
fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, AiError> {
        let api_key = self.api_key()?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
                temperature: request.temperature,
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Transport(format!("request timed out: {}", e))
                } else {
                    AiError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AiError::Malformed(e.to_string()))?;

        Ok(first_candidate_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> GeminiClient {
        let config = AiConfig {
            base_url: base_url.to_string(),
            api_key_env: "PROSPAN_TEST_GEMINI_UNIT_KEY_UNSET".to_string(),
            ..AiConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let c = client("http://localhost:9999/v1beta/");
        assert_eq!(
            c.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        // Port 9 (discard) would fail with a transport error if contacted.
        let c = client("http://127.0.0.1:9");
        let err = c.generate(&GenerateRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey(ref v) if v == "PROSPAN_TEST_GEMINI_UNIT_KEY_UNSET"));
    }

    #[test]
    fn candidate_parts_are_concatenated() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(first_candidate_text(resp).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn blocked_prompt_yields_no_text() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(first_candidate_text(resp).is_none());
    }

    #[test]
    fn request_body_shape() {
        let schema = serde_json::json!({"type": "OBJECT"});
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "prompt" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(&schema),
                temperature: Some(0.1),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(json["generationConfig"]["temperature"].as_f64().is_some());
    }
}
