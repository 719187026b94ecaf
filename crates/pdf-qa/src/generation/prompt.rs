//! Prompt templates for grounded answering

use crate::types::Chunk;

/// Identifier of the template produced by `PromptBuilder`
pub const PROMPT_VERSION: &str = "grounded-qa/v1";

/// Reply the model is told to give when the excerpts do not cover the question
pub const NOT_IN_CONTEXT: &str = "I don't know based on the provided document.";

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join chunk texts in ranking order
    pub fn build_context(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("[{}]\n{}", i + 1, chunk.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Build the full prompt with strict grounding
    pub fn build_grounded_prompt(question: &str, chunks: &[Chunk]) -> String {
        format!(
            r#"You answer questions about a single uploaded document.

RULES:
1. Use ONLY information stated in the CONTEXT below
2. If the context does not contain the answer, reply exactly: "{fallback}"
3. Do not use outside knowledge or guess

CONTEXT:
{context}

QUESTION: {question}

ANSWER:"#,
            fallback = NOT_IN_CONTEXT,
            context = Self::build_context(chunks),
            question = question
        )
    }
}
