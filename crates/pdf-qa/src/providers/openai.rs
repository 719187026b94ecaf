//! OpenAI chat completions provider

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::llm::{CompletionRequest, LlmProvider};

const SYSTEM_MESSAGE: &str =
    "You answer questions about an uploaded document using only the excerpts you are given.";

pub struct OpenAiLlm {
    client: Client,
    base_url: String,
    model: String,
    headers: HeaderMap,
}

impl OpenAiLlm {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        let mut auth = HeaderValue::from_str(&auth)
            .map_err(|_| Error::Config("invalid OpenAI API key".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            headers,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::synthesis(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::synthesis(format!(
                "OpenAI returned {}: {}",
                status, text
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::synthesis(format!("failed to parse OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::synthesis("OpenAI returned no choices"))
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .headers(self.headers.clone())
            .send()
            .await;
        match response {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::spawn_mock;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    fn config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let app = Router::new().route(
            "/chat/completions",
            post(|headers: AxumHeaders, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-3.5-turbo");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "What color is the sky?");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": " Blue. " } }]
                }))
            }),
        );
        let base = spawn_mock(app).await;

        let llm = OpenAiLlm::new(&config(&base), "sk-test").unwrap();
        let answer = llm
            .complete(CompletionRequest {
                prompt: "What color is the sky?",
                temperature: 0.7,
            })
            .await
            .unwrap();
        assert_eq!(answer, "Blue.");
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        );
        let base = spawn_mock(app).await;

        let llm = OpenAiLlm::new(&config(&base), "sk-test").unwrap();
        let err = llm
            .complete(CompletionRequest {
                prompt: "q",
                temperature: 0.7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SynthesisUnavailable(ref msg) if msg.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_no_choices_is_unavailable() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = spawn_mock(app).await;

        let llm = OpenAiLlm::new(&config(&base), "sk-test").unwrap();
        let result = llm
            .complete(CompletionRequest {
                prompt: "q",
                temperature: 0.7,
            })
            .await;
        assert!(matches!(result, Err(Error::SynthesisUnavailable(_))));
    }

    #[test]
    fn test_invalid_key_is_config_error() {
        let result = OpenAiLlm::new(&LlmConfig::default(), "bad\nkey");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
