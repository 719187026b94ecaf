//! Pluggable embedding and language model providers
//!
//! The pipeline only sees the `EmbeddingProvider` and `LlmProvider` traits.
//! Concrete backends are chosen from config at startup.

pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::{CompletionRequest, LlmProvider};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use openai::OpenAiLlm;

use std::sync::Arc;

use crate::config::{AppConfig, LlmBackend, Secrets};
use crate::error::{Error, Result};

/// Build the embedding provider named by config
pub fn build_embedder(config: &AppConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder = OllamaEmbedder::new(&config.embeddings)?;
    tracing::info!(
        "Embeddings: ollama ({}, {} dims) at {}",
        embedder.model(),
        config.embeddings.dimensions,
        config.embeddings.base_url
    );
    Ok(Arc::new(embedder))
}

/// Build the language model provider named by config
pub fn build_llm(config: &AppConfig, secrets: &Secrets) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.llm.provider {
        LlmBackend::OpenAi => {
            let key = secrets.openai_api_key.as_deref().ok_or_else(|| {
                Error::Config("OpenAI provider selected but no API key configured".to_string())
            })?;
            Arc::new(OpenAiLlm::new(&config.llm, key)?)
        }
        LlmBackend::Ollama => Arc::new(OllamaLlm::new(&config.llm)?),
    };
    tracing::info!("LLM: {} ({})", llm.name(), llm.model());
    Ok(llm)
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{CompletionRequest, EmbeddingProvider, LlmProvider};
    use crate::error::{Error, Result};

    pub(crate) const VOCABULARY: &[&str] = &[
        "the", "is", "what", "color", "sky", "blue", "grass", "green",
    ];

    /// Bag-of-words over a fixed vocabulary, counting calls
    #[derive(Default)]
    pub(crate) struct WordCountEmbedder {
        pub(crate) calls: AtomicUsize,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for WordCountEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::embedding("model not loaded"));
            }
            let mut vector = vec![0.0f32; VOCABULARY.len()];
            for word in text.split(|c: char| !c.is_alphanumeric()) {
                let word = word.to_lowercase();
                if let Some(i) = VOCABULARY.iter().position(|v| *v == word) {
                    vector[i] += 1.0;
                }
            }
            Ok(vector)
        }

        fn dimensions(&self) -> usize {
            VOCABULARY.len()
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!self.fail)
        }

        fn name(&self) -> &str {
            "word-count"
        }
    }

    /// Replies with the top-ranked context excerpt, counting calls
    #[derive(Default)]
    pub(crate) struct TopExcerptLlm {
        pub(crate) calls: AtomicUsize,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl LlmProvider for TopExcerptLlm {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::synthesis("rate limited"));
            }
            Ok(request
                .prompt
                .split("[1]\n")
                .nth(1)
                .and_then(|rest| rest.lines().next())
                .unwrap_or("")
                .to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "top-excerpt"
        }

        fn model(&self) -> &str {
            "stub"
        }
    }

    /// Serve `app` on an ephemeral local port and return its base URL
    pub(crate) async fn spawn_mock(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_llm_by_backend() {
        let mut config = AppConfig::default();
        let secrets = Secrets {
            openai_api_key: Some("sk-test".to_string()),
        };
        assert_eq!(build_llm(&config, &secrets).unwrap().name(), "openai");

        config.llm.provider = LlmBackend::Ollama;
        let none = Secrets {
            openai_api_key: None,
        };
        assert_eq!(build_llm(&config, &none).unwrap().name(), "ollama");
    }

    #[test]
    fn test_build_llm_without_key() {
        let config = AppConfig::default();
        let secrets = Secrets {
            openai_api_key: None,
        };
        assert!(matches!(build_llm(&config, &secrets), Err(Error::Config(_))));
    }

    #[test]
    fn test_build_embedder() {
        let embedder = build_embedder(&AppConfig::default()).unwrap();
        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.name(), "ollama");
    }
}
