//! Build and query pipelines over a single session

use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::generation::AnswerSynthesizer;
use crate::ingestion::{PdfExtractor, TextChunker};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::VectorIndex;
use crate::types::{Document, Turn};

use super::state::{ActiveDocument, Session};

/// Reply given to questions asked before any upload
pub const NO_DOCUMENT_MESSAGE: &str = "Please upload a PDF file first.";

/// What a successful upload produced
#[derive(Debug, Clone)]
pub struct UploadSummary {
    pub document_id: Uuid,
    pub filename: String,
    /// SHA-256 of the uploaded bytes, hex encoded
    pub content_hash: String,
    pub pages: usize,
    pub chunks: usize,
    pub dimensions: usize,
    pub message: String,
}

/// Result of `SessionManager::ask`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Blank input; nothing was recorded
    Ignored,
    /// No document uploaded; carries the prompt to upload one
    NoDocument(String),
    /// Grounded answer
    Answered(String),
    /// A provider failed; carries the apology shown to the user
    Failed(String),
}

impl AskOutcome {
    /// Text appended to the transcript as the bot turn, if any
    pub fn reply(&self) -> Option<&str> {
        match self {
            AskOutcome::Ignored => None,
            AskOutcome::NoDocument(m) | AskOutcome::Answered(m) | AskOutcome::Failed(m) => {
                Some(m)
            }
        }
    }
}

/// Orchestrates extraction, chunking, embedding, retrieval and synthesis
///
/// Holds no per-session data. Callers pass the `Session` they hold the lock for.
pub struct SessionManager {
    embedder: Arc<dyn EmbeddingProvider>,
    synthesizer: AnswerSynthesizer,
    chunker: TextChunker,
    top_k: usize,
    embed_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        synthesizer: AnswerSynthesizer,
        chunker: TextChunker,
        top_k: usize,
        embed_timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            synthesizer,
            chunker,
            top_k,
            embed_timeout,
        }
    }

    /// Wire a manager from validated config and constructed providers
    pub fn from_config(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        Ok(Self::new(
            embedder,
            AnswerSynthesizer::from_config(llm, &config.llm),
            TextChunker::from_config(&config.chunking)?,
            config.retrieval.top_k,
            config.embeddings.timeout(),
        ))
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.synthesizer
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Replace the session's document with `bytes`
    ///
    /// All or nothing: on failure the previous document and index stay
    /// active and the error message is recorded on the session.
    pub async fn upload(
        &self,
        session: &mut Session,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadSummary> {
        session.touch();
        let start = Instant::now();

        match self.build(filename, content_type, bytes).await {
            Ok(active) => {
                let summary = UploadSummary {
                    document_id: active.document.id,
                    filename: active.document.filename.clone(),
                    content_hash: active.document.content_hash.clone(),
                    pages: active.document.page_count(),
                    chunks: active.index.len(),
                    dimensions: active.index.dimension(),
                    message: format!("Successfully processed '{}'", filename),
                };
                tracing::info!(
                    "Session {}: indexed '{}' [sha256 {}] ({} pages, {} chunks) in {:?}",
                    session.id(),
                    filename,
                    &summary.content_hash[..12],
                    summary.pages,
                    summary.chunks,
                    start.elapsed()
                );
                session.install(active);
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!("Session {}: upload of '{}' failed: {}", session.id(), filename, e);
                session.record_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn build(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<ActiveDocument> {
        if !PdfExtractor::is_pdf_upload(filename, content_type) {
            return Err(Error::UnsupportedFileType(format!(
                "'{}' is not a PDF file",
                filename
            )));
        }

        let content_hash = hex::encode(Sha256::digest(&bytes));
        let pages = PdfExtractor::extract_async(bytes).await?;

        let chunks = self.chunker.split(&pages);
        if chunks.is_empty() {
            return Err(Error::unreadable("document has no extractable text"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embed_batch(&texts).await?;
        let index = VectorIndex::build(chunks, embeddings)?;

        Ok(ActiveDocument {
            document: Document::new(filename, content_hash, pages),
            index,
        })
    }

    /// Embed all chunk texts; the timeout budget is per text
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let count = u32::try_from(texts.len()).unwrap_or(u32::MAX).max(1);
        let budget = self.embed_timeout.saturating_mul(count);

        tokio::time::timeout(budget, self.embedder.embed_batch(texts))
            .await
            .map_err(|_| {
                Error::embedding(format!(
                    "embedding {} chunks timed out after {}s",
                    texts.len(),
                    budget.as_secs()
                ))
            })?
    }

    /// Answer `question` against the session's document
    ///
    /// Blank questions are ignored. Every other question is recorded with its
    /// reply, including apologies for provider failures.
    pub async fn ask(&self, session: &mut Session, question: &str) -> AskOutcome {
        if question.trim().is_empty() {
            return AskOutcome::Ignored;
        }
        session.touch();

        let Some(active) = session.active() else {
            session.push(Turn::user(question));
            session.push(Turn::bot(NO_DOCUMENT_MESSAGE));
            return AskOutcome::NoDocument(NO_DOCUMENT_MESSAGE.to_string());
        };

        let start = Instant::now();
        let result = self.answer(active, question).await;
        session.push(Turn::user(question));

        let outcome = match result {
            Ok(answer) => {
                tracing::info!(
                    "Session {}: answered in {:?}",
                    session.id(),
                    start.elapsed()
                );
                AskOutcome::Answered(answer)
            }
            Err(e) => {
                tracing::warn!("Session {}: could not answer: {}", session.id(), e);
                AskOutcome::Failed(format!("Sorry, I couldn't answer that: {}", e))
            }
        };

        if let Some(reply) = outcome.reply() {
            session.push(Turn::bot(reply));
        }
        outcome
    }

    async fn answer(&self, active: &ActiveDocument, question: &str) -> Result<String> {
        let query = tokio::time::timeout(self.embed_timeout, self.embedder.embed(question))
            .await
            .map_err(|_| {
                Error::embedding(format!(
                    "embedding timed out after {}s",
                    self.embed_timeout.as_secs()
                ))
            })??;

        let results = active.index.retrieve(&query, self.top_k)?;
        tracing::debug!(
            "Retrieved {} chunks (best similarity {:.3})",
            results.len(),
            results.first().map(|r| r.similarity).unwrap_or(0.0)
        );

        let chunks: Vec<_> = results.into_iter().map(|r| r.chunk).collect();
        self.synthesizer.synthesize(question, &chunks).await
    }

    /// End a session, dropping its document and transcript
    pub fn end(&self, session: &mut Session) {
        tracing::info!("Session {}: ended", session.id());
        session.end();
    }
}
