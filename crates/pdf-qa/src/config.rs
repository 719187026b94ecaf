//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";
const OLLAMA_MODEL: &str = "llama3.2:3b";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Language model configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Session lifecycle configuration
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration: defaults, then an optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text (missing sections fall back to defaults)
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        config.resolve_llm_defaults();
        Ok(config)
    }

    /// Swap OpenAI endpoint defaults for Ollama ones when Ollama is selected
    ///
    /// Only values still equal to the OpenAI defaults are replaced. The LLM
    /// then talks to the same Ollama server as the embedder.
    fn resolve_llm_defaults(&mut self) {
        if self.llm.provider != LlmBackend::Ollama {
            return;
        }
        if self.llm.base_url == OPENAI_BASE_URL {
            self.llm.base_url = self.embeddings.base_url.clone();
        }
        if self.llm.model == OPENAI_MODEL {
            self.llm.model = OLLAMA_MODEL.to_string();
        }
    }

    /// Apply `PDF_QA_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PDF_QA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PDF_QA_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("PDF_QA_PORT is not a port: {}", port)))?;
        }
        if let Some(provider) = lookup("PDF_QA_LLM_PROVIDER") {
            self.llm.provider = match provider.to_lowercase().as_str() {
                "openai" => LlmBackend::OpenAi,
                "ollama" => LlmBackend::Ollama,
                other => {
                    return Err(Error::Config(format!("Unknown LLM provider: {}", other)));
                }
            };
        }
        if let Some(model) = lookup("PDF_QA_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(temperature) = lookup("PDF_QA_TEMPERATURE") {
            self.llm.temperature = temperature.parse().map_err(|_| {
                Error::Config(format!("PDF_QA_TEMPERATURE is not a number: {}", temperature))
            })?;
        }
        if let Some(model) = lookup("PDF_QA_EMBED_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            self.embeddings.base_url = base_url.clone();
            if self.llm.provider == LlmBackend::Ollama {
                self.llm.base_url = base_url;
            }
        }
        self.resolve_llm_defaults();
        Ok(())
    }

    /// Reject configurations that can never work at runtime
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.max_chars == 0 || chunking.overlap_chars >= chunking.max_chars {
            return Err(Error::InvalidChunkConfig {
                max_chars: chunking.max_chars,
                overlap_chars: chunking.overlap_chars,
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if !self.llm.temperature.is_finite() || self.llm.temperature < 0.0 {
            return Err(Error::Config(format!(
                "llm.temperature must be a non-negative number, got {}",
                self.llm.temperature
            )));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(Error::Config("session.sweep_interval_secs must be at least 1".to_string()));
        }
        if self.llm.model.trim().is_empty() || self.embeddings.model.trim().is_empty() {
            return Err(Error::Config("model identifiers must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub max_chars: usize,
    /// Characters shared between consecutive chunks of a page
    pub overlap_chars: usize,
    /// How far back from the window edge to look for whitespace
    pub boundary_tolerance: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap_chars: 200,
            boundary_tolerance: 100,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model to use (default: all-minilm, i.e. all-MiniLM-L6-v2)
    pub model: String,
    /// Ollama base URL serving the embedding model
    pub base_url: String,
    /// Expected embedding dimensions (384 for MiniLM)
    pub dimensions: usize,
    /// Timeout for a single embedding call in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-minilm".to_string(),
            base_url: OLLAMA_BASE_URL.to_string(),
            dimensions: 384,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Language model backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// OpenAI chat completions
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider
    pub provider: LlmBackend,
    /// Generation model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Timeout for one completion in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmBackend::OpenAi,
            model: OPENAI_MODEL.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the synthesizer
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Session lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are ended
    pub idle_timeout_secs: u64,
    /// How often the idle sweep runs
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Secrets read once at process start
#[derive(Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Read secrets required by the configured backends
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::from_lookup(config, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(config: &AppConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup(OPENAI_API_KEY_ENV).filter(|k| !k.trim().is_empty());

        if config.llm.provider == LlmBackend::OpenAi && openai_api_key.is_none() {
            return Err(Error::Config(format!(
                "{} must be set when llm.provider = \"openai\"",
                OPENAI_API_KEY_ENV
            )));
        }

        Ok(Self { openai_api_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunking.max_chars, 1000);
        assert_eq!(config.chunking.overlap_chars, 200);
        assert_eq!(config.retrieval.top_k, 4);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [chunking]
            max_chars = 500

            [llm]
            provider = "ollama"
            model = "phi3"
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.max_chars, 500);
        assert_eq!(config.chunking.overlap_chars, 200);
        assert_eq!(config.llm.provider, LlmBackend::Ollama);
        assert_eq!(config.llm.model, "phi3");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_ollama_provider_gets_ollama_endpoint() {
        let config = AppConfig::from_toml_str("[llm]\nprovider = \"ollama\"\n").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3.2:3b");

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(lookup_from(&[("PDF_QA_LLM_PROVIDER", "ollama")]))
            .unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.llm.model, "llama3.2:3b");

        // Explicit values are kept
        let config = AppConfig::from_toml_str(
            "[embeddings]\nbase_url = \"http://gpu:11434\"\n[llm]\nprovider = \"ollama\"\nmodel = \"phi3\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.base_url, "http://gpu:11434");
        assert_eq!(config.llm.model, "phi3");

        // OpenAI keeps its own endpoint
        let config = AppConfig::from_toml_str("[llm]\nmodel = \"gpt-4o-mini\"\n").unwrap();
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_invalid_chunking_fails_fast() {
        let mut config = AppConfig::default();
        config.chunking.overlap_chars = config.chunking.max_chars;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidChunkConfig { .. })
        ));
    }

    #[test]
    fn test_zero_sweep_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.session.sweep_interval_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert_eq!(AppConfig::default().session.idle_timeout().as_secs(), 3600);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("PDF_QA_PORT", "9090"),
                ("PDF_QA_LLM_PROVIDER", "ollama"),
                ("PDF_QA_TEMPERATURE", "0.2"),
                ("OLLAMA_BASE_URL", "http://ollama:11434"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.llm.provider, LlmBackend::Ollama);
        assert_eq!(config.llm.base_url, "http://ollama:11434");
        assert_eq!(config.embeddings.base_url, "http://ollama:11434");
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(lookup_from(&[("PDF_QA_PORT", "http")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_api_key_is_startup_error() {
        let config = AppConfig::default();
        assert!(Secrets::from_lookup(&config, lookup_from(&[])).is_err());

        let secrets =
            Secrets::from_lookup(&config, lookup_from(&[(OPENAI_API_KEY_ENV, "sk-test")])).unwrap();
        assert_eq!(secrets.openai_api_key.as_deref(), Some("sk-test"));
        assert!(!format!("{:?}", secrets).contains("sk-test"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmBackend::Ollama;
        assert!(Secrets::from_lookup(&config, lookup_from(&[])).is_ok());
    }
}
