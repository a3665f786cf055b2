use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use prospan_core::prompt::{DEFAULT_LANGUAGE, DEFAULT_MAX_EXTRACT_CHARS};

/// Path checked when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/prospan.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key. Read at call time.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

impl AiConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    /// Working language of prompts and answers.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_max_extract_chars")]
    pub max_extract_chars: usize,
    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,
    /// Unset leaves the provider's default sampling temperature.
    #[serde(default)]
    pub search_temperature: Option<f32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_extract_chars: default_max_extract_chars(),
            extraction_temperature: default_extraction_temperature(),
            search_temperature: None,
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_max_extract_chars() -> usize {
    DEFAULT_MAX_EXTRACT_CHARS
}
fn default_extraction_temperature() -> f32 {
    0.1
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if given, else the default path if it exists, else defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return load_config(path);
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_config(&default_path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    match config.ai.provider.as_str() {
        "gemini" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown AI provider: '{}'. Must be gemini or disabled.",
            other
        ),
    }

    if config.ai.is_enabled() {
        if config.ai.model.trim().is_empty() {
            anyhow::bail!("ai.model must not be empty");
        }
        if config.ai.api_key_env.trim().is_empty() {
            anyhow::bail!("ai.api_key_env must not be empty");
        }
    }

    if config.ai.timeout_secs == Some(0) {
        anyhow::bail!("ai.timeout_secs must be > 0 when set");
    }

    if config.assistant.max_extract_chars == 0 {
        anyhow::bail!("assistant.max_extract_chars must be > 0");
    }

    if !(0.0..=2.0).contains(&config.assistant.extraction_temperature) {
        anyhow::bail!("assistant.extraction_temperature must be in [0.0, 2.0]");
    }
    if let Some(t) = config.assistant.search_temperature {
        if !(0.0..=2.0).contains(&t) {
            anyhow::bail!("assistant.search_temperature must be in [0.0, 2.0]");
        }
    }

    if config.assistant.language.trim().is_empty() {
        anyhow::bail!("assistant.language must not be empty");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prospan.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let (_tmp, path) = write_config("");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.ai.provider, "gemini");
        assert_eq!(cfg.ai.model, "gemini-2.5-flash");
        assert_eq!(cfg.ai.api_key_env, "API_KEY");
        assert!(cfg.ai.timeout_secs.is_none());
        assert_eq!(cfg.assistant.max_extract_chars, 30_000);
        assert!((cfg.assistant.extraction_temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(cfg.assistant.language, "Vietnamese");
        assert_eq!(cfg.server.bind, "127.0.0.1:7341");
    }

    #[test]
    fn overrides_are_read() {
        let (_tmp, path) = write_config(
            r#"
[ai]
provider = "disabled"
api_key_env = "GEMINI_KEY"
timeout_secs = 20

[assistant]
language = "English"
max_extract_chars = 500
search_temperature = 0.4

[server]
bind = "0.0.0.0:9000"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert!(!cfg.ai.is_enabled());
        assert_eq!(cfg.ai.api_key_env, "GEMINI_KEY");
        assert_eq!(cfg.ai.timeout_secs, Some(20));
        assert_eq!(cfg.assistant.language, "English");
        assert_eq!(cfg.assistant.max_extract_chars, 500);
        assert_eq!(cfg.assistant.search_temperature, Some(0.4));
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn unknown_provider_rejected() {
        let (_tmp, path) = write_config("[ai]\nprovider = \"openai\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown AI provider"));
    }

    #[test]
    fn zero_extract_chars_rejected() {
        let (_tmp, path) = write_config("[assistant]\nmax_extract_chars = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn temperature_out_of_range_rejected() {
        let (_tmp, path) = write_config("[assistant]\nextraction_temperature = 3.5\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("extraction_temperature"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/prospan.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
