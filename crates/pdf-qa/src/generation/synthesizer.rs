//! Grounded answer synthesis over a language model

use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::{CompletionRequest, LlmProvider};
use crate::types::Chunk;

use super::prompt::{PromptBuilder, PROMPT_VERSION};

/// Turns a question and retrieved chunks into one answer string
///
/// Each call makes a single model request bounded by `timeout`. Failures,
/// timeouts and empty replies all surface as `Error::SynthesisUnavailable`.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    timeout: Duration,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>, temperature: f32, timeout: Duration) -> Self {
        Self {
            llm,
            temperature,
            timeout,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self::new(llm, config.temperature, config.timeout())
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Answer `question` from `chunks`, which are expected in ranking order
    pub async fn synthesize(&self, question: &str, chunks: &[Chunk]) -> Result<String> {
        let prompt = PromptBuilder::build_grounded_prompt(question, chunks);
        let start = std::time::Instant::now();

        tracing::debug!(
            "Synthesizing with {} ({}), template {}, {} chunks",
            self.llm.name(),
            self.llm.model(),
            PROMPT_VERSION,
            chunks.len()
        );

        let request = CompletionRequest {
            prompt: &prompt,
            temperature: self.temperature,
        };

        let answer = match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(Error::SynthesisUnavailable(msg))) => return Err(Error::SynthesisUnavailable(msg)),
            Ok(Err(e)) => return Err(Error::synthesis(e.to_string())),
            Err(_) => {
                return Err(Error::synthesis(format!(
                    "language model timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(Error::synthesis("language model returned an empty answer"));
        }

        tracing::debug!("Synthesized answer in {:?}", start.elapsed());
        Ok(answer.to_string())
    }
}
