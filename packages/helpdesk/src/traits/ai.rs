//! AI traits for LLM operations.
//!
//! The pipeline consumes two opaque capabilities:
//! - Text completion (classification prompt, response generation)
//! - Embedding generation (knowledge chunks at build time, queries at retrieval time)
//!
//! Both may fail. Callers map failures onto degraded paths instead of
//! propagating them to the requester.

use async_trait::async_trait;

use crate::error::Result;

/// Text completion capability.
///
/// Implementations wrap specific LLM providers (OpenAI, Anthropic, etc.)
/// and return the raw text of the first choice.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` under the given system instructions.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Embedding capability.
///
/// Must be deterministic for identical input, and the same model must be
/// used for knowledge chunks and live queries so both share one vector space.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Generate embedding for text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch operation).
    ///
    /// Output order matches input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // Default implementation calls embed sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// Composite trait for providers that offer both capabilities.
///
/// This is the bound used by [`HelpDesk`](crate::HelpDesk).
pub trait AI: LanguageModel + EmbeddingModel {}

// Blanket implementation: anything implementing both traits is an AI
impl<T: LanguageModel + EmbeddingModel> AI for T {}
