//! Ollama-based providers for embeddings and LLM
//!
//! Both providers wrap one `OllamaClient`. Requests are single attempts;
//! failures surface as availability errors for the caller to report.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{CompletionRequest, LlmProvider};

/// Thin client for the Ollama HTTP API
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Embed one text with `/api/embeddings`
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Ollama embed error {}: {}",
                status, body
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("invalid Ollama embed response: {}", e)))?;

        if result.embedding.is_empty() {
            return Err(Error::embedding("Ollama returned an empty embedding"));
        }

        Ok(result.embedding)
    }

    /// Run a non-streaming completion with `/api/generate`
    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
                options: GenerateOptions { temperature },
            })
            .send()
            .await
            .map_err(|e| Error::synthesis(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::synthesis(format!(
                "Ollama generate error {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::synthesis(format!("invalid Ollama generate response: {}", e)))?;

        Ok(result.response.trim().to_string())
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

/// Ollama embedding provider using all-minilm or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.base_url, config.timeout())?;
        Ok(Self::from_client(
            Arc::new(client),
            config.model.clone(),
            config.dimensions,
        ))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String, dimensions: usize) -> Self {
        Self {
            client,
            model,
            dimensions,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.client.embed(&self.model, text).await?;
        // A model swap without a config change would silently mix vector spaces
        if embedding.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                found: embedding.len(),
            });
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = OllamaClient::new(&config.base_url, config.timeout())?;
        Ok(Self::from_client(Arc::new(client), config.model.clone()))
    }

    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
        self.client
            .generate(&self.model, request.prompt, request.temperature)
            .await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::spawn_mock;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn client(base_url: &str) -> Arc<OllamaClient> {
        Arc::new(OllamaClient::new(base_url, Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_embed_sends_model_and_prompt() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "all-minilm");
                assert_eq!(body["prompt"], "The sky is blue.");
                Json(json!({ "embedding": [0.1, 0.2, 0.3] }))
            }),
        );
        let base = spawn_mock(app).await;

        let embedder = OllamaEmbedder::from_client(client(&base), "all-minilm".into(), 3);
        let vector = embedder.embed("The sky is blue.").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|Json(body): Json<Value>| async move {
                let len = body["prompt"].as_str().unwrap_or_default().len() as f32;
                Json(json!({ "embedding": [len, 1.0] }))
            }),
        );
        let base = spawn_mock(app).await;

        let embedder = OllamaEmbedder::from_client(client(&base), "m".into(), 2);
        let texts = vec!["a".to_string(), "abc".to_string(), "ab".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();
        let firsts: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(firsts, vec![1.0, 3.0, 2.0]);
    }

    #[tokio::test]
    async fn test_embed_wrong_dimension() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|| async { Json(json!({ "embedding": [1.0, 2.0] })) }),
        );
        let base = spawn_mock(app).await;

        let embedder = OllamaEmbedder::from_client(client(&base), "m".into(), 384);
        let result = embedder.embed("x").await;
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 384,
                found: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_embed_server_error_is_unavailable() {
        let app = Router::new().route(
            "/api/embeddings",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let base = spawn_mock(app).await;

        let embedder = OllamaEmbedder::from_client(client(&base), "m".into(), 3);
        let err = embedder.embed("x").await.unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(ref msg) if msg.contains("model not loaded")));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Port 9 (discard) is closed on test hosts
        let embedder = OllamaEmbedder::from_client(client("http://127.0.0.1:9"), "m".into(), 3);
        assert!(matches!(
            embedder.embed("x").await,
            Err(Error::EmbeddingUnavailable(_))
        ));
        assert!(!embedder.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_generate_sends_temperature() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "phi3");
                assert_eq!(body["stream"], false);
                assert!((body["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
                Json(json!({ "response": "  The sky is blue.\n" }))
            }),
        );
        let base = spawn_mock(app).await;

        let llm = OllamaLlm::from_client(client(&base), "phi3".into());
        let answer = llm
            .complete(CompletionRequest {
                prompt: "What color is the sky?",
                temperature: 0.2,
            })
            .await
            .unwrap();
        assert_eq!(answer, "The sky is blue.");
        assert_eq!(llm.model(), "phi3");
    }

    #[tokio::test]
    async fn test_generate_error_is_unavailable() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = spawn_mock(app).await;

        let llm = OllamaLlm::from_client(client(&base), "phi3".into());
        let result = llm
            .complete(CompletionRequest {
                prompt: "q",
                temperature: 0.7,
            })
            .await;
        assert!(matches!(result, Err(Error::SynthesisUnavailable(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }
}
