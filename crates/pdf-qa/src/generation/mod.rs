//! Answer generation: prompt assembly and grounded synthesis

mod prompt;
mod synthesizer;

pub use prompt::{PromptBuilder, PROMPT_VERSION};
pub use synthesizer::AnswerSynthesizer;
