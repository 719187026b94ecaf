//! Language model provider trait

use async_trait::async_trait;

use crate::error::Result;

/// One completion call
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Fully assembled prompt
    pub prompt: &'a str,
    /// Sampling temperature
    pub temperature: f32,
}

/// Text completion capability: `complete(prompt) -> text`
///
/// Failures surface as `Error::SynthesisUnavailable`.
///
/// Implementations:
/// - `OpenAiLlm`: OpenAI chat completions
/// - `OllamaLlm`: Local Ollama server (phi3, llama3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a single completion
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
