//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the help desk library
//! without making real AI or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{HelpdeskError, Result};
use crate::pipeline::prompts::CLASSIFY_SYSTEM_PROMPT;
use crate::traits::ai::{EmbeddingModel, LanguageModel};
use crate::types::category::CategoryDefinition;
use crate::types::knowledge::RawChunk;

/// A mock AI implementation for testing.
///
/// Returns deterministic, configurable responses for completions and
/// embeddings. Clones share state, so a test can keep a handle for
/// assertions (or to flip failure switches) after moving the mock into a
/// [`HelpDesk`](crate::HelpDesk).
#[derive(Clone, Default)]
pub struct MockAI {
    /// Canned classification response (raw model text)
    classification: Arc<RwLock<Option<String>>>,

    /// Canned generation response
    completion: Arc<RwLock<Option<String>>>,

    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Failure switches
    failures: Arc<RwLock<MockFailures>>,

    /// Artificial latency added to completions
    delay: Option<Duration>,

    /// Default embedding dimension
    embedding_dim: usize,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

#[derive(Debug, Clone, Copy, Default)]
struct MockFailures {
    completions: bool,
    generation: bool,
    embeddings: bool,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAICall {
    Classify { prompt: String },
    Generate { prompt: String },
    Embed { text: String },
}

impl MockAI {
    /// Dimension of generated embeddings unless overridden.
    pub const EMBEDDING_DIM: usize = 64;

    /// Create a new mock AI with default behavior.
    pub fn new() -> Self {
        Self {
            embedding_dim: Self::EMBEDDING_DIM,
            ..Default::default()
        }
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Answer classification prompts with this category.
    pub fn with_classification(
        self,
        category: impl Into<String>,
        confidence: f32,
        reasoning: impl Into<String>,
    ) -> Self {
        let response = serde_json::json!({
            "category": category.into(),
            "confidence": confidence,
            "reasoning": reasoning.into(),
        });
        self.with_raw_classification(response.to_string())
    }

    /// Answer classification prompts with raw text.
    pub fn with_raw_classification(self, response: impl Into<String>) -> Self {
        *self.classification.write().unwrap() = Some(response.into());
        self
    }

    /// Answer generation prompts with this text.
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        *self.completion.write().unwrap() = Some(text.into());
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Delay every completion by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every completion.
    pub fn failing_completions(self) -> Self {
        self.failures.write().unwrap().completions = true;
        self
    }

    /// Fail generation but keep answering classification prompts.
    pub fn failing_generation(self) -> Self {
        self.failures.write().unwrap().generation = true;
        self
    }

    /// Fail every embedding.
    pub fn failing_embeddings(self) -> Self {
        self.set_embeddings_failing(true);
        self
    }

    /// Toggle embedding failures on a shared handle.
    pub fn set_embeddings_failing(&self, failing: bool) {
        self.failures.write().unwrap().embeddings = failing;
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }

    /// Prompts of completion calls, classification and generation alike.
    pub fn complete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockAICall::Classify { prompt } | MockAICall::Generate { prompt } => Some(prompt),
                MockAICall::Embed { .. } => None,
            })
            .collect()
    }

    /// Texts of embedding calls.
    pub fn embed_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockAICall::Embed { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Generate a deterministic embedding based on text.
    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        // Use hash bytes to seed a deterministic embedding
        (0..self.embedding_dim)
            .map(|i| {
                let byte_idx = i % 32;
                let byte = hash[byte_idx] as f32;
                // Normalize to [-1, 1] range
                (byte / 127.5) - 1.0
            })
            .collect()
    }

    fn failure(message: &str) -> HelpdeskError {
        HelpdeskError::AI(message.to_string().into())
    }
}

#[async_trait]
impl LanguageModel for MockAI {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let classifying = system == CLASSIFY_SYSTEM_PROMPT;
        self.calls.write().unwrap().push(if classifying {
            MockAICall::Classify {
                prompt: prompt.to_string(),
            }
        } else {
            MockAICall::Generate {
                prompt: prompt.to_string(),
            }
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failures = *self.failures.read().unwrap();
        if failures.completions {
            return Err(Self::failure("mock completion failure"));
        }

        if classifying {
            self.classification
                .read()
                .unwrap()
                .clone()
                .ok_or_else(|| Self::failure("no classification configured"))
        } else if failures.generation {
            Err(Self::failure("mock generation failure"))
        } else {
            Ok(self
                .completion
                .read()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "Mock response".to_string()))
        }
    }
}

#[async_trait]
impl EmbeddingModel for MockAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(MockAICall::Embed {
            text: text.to_string(),
        });

        if self.failures.read().unwrap().embeddings {
            return Err(HelpdeskError::Embedding("mock embedding failure".to_string()));
        }

        // Return predefined embedding or generate deterministic one
        Ok(self
            .embeddings
            .read()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.generate_deterministic_embedding(text)))
    }
}

/// A small IT knowledge base for tests and demos.
pub fn sample_chunks() -> Vec<RawChunk> {
    vec![
        RawChunk::new(
            "password-reset",
            "Password reset: visit https://password.techcorp.com and enter your company email. \
             Passwords must be at least 12 characters. Accounts lock for 30 minutes after 5 failed attempts.",
            "company_it_policies.md",
            "password_reset",
        ),
        RawChunk::new(
            "vpn-setup",
            "VPN: install GlobalProtect, connect to vpn.techcorp.com and sign in with your company credentials.",
            "installation_guides.json",
            "network_connectivity",
        ),
        RawChunk::new(
            "outlook-sync",
            "Outlook sync issues: check your connection, then remove and re-add the account. IMAP server is imap.techcorp.com.",
            "troubleshooting_database.json",
            "email_configuration",
        ),
        RawChunk::new(
            "software-approval",
            "Only approved software may be installed. New software requires manager approval and an IT ticket.",
            "company_it_policies.md",
            "software_installation",
        ),
        RawChunk::new(
            "security-report",
            "Report suspected security incidents to security@techcorp.com immediately. Do not power off the device.",
            "company_it_policies.md",
            "security_incident",
        ),
    ]
}

/// A minimal category set for tests: two categories plus a default.
pub fn sample_categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::new("billing", "Invoices and payments")
            .with_keywords(["invoice", "payment", "refund"])
            .with_triggers(["chargeback"])
            .with_contact("billing@example.com"),
        CategoryDefinition::new("outage", "Service outages")
            .with_keywords(["outage", "unavailable", "offline"])
            .with_contact("oncall@example.com"),
        CategoryDefinition::new("other", "Everything else"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ai_embed_deterministic() {
        let ai = MockAI::new().with_embedding_dim(128);

        let emb1 = ai.embed("hello").await.unwrap();
        let emb2 = ai.embed("hello").await.unwrap();
        let emb3 = ai.embed("world").await.unwrap();

        assert_eq!(emb1.len(), 128);
        assert_eq!(emb1, emb2); // Same input = same output
        assert_ne!(emb1, emb3); // Different input = different output
        assert_eq!(ai.embed_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_ai_routes_by_system_prompt() {
        let ai = MockAI::new()
            .with_classification("password_reset", 0.9, "password")
            .with_completion("Try the portal");

        let classification = ai.complete(CLASSIFY_SYSTEM_PROMPT, "classify").await.unwrap();
        assert!(classification.contains("password_reset"));

        let generation = ai.complete("You are helpful", "respond").await.unwrap();
        assert_eq!(generation, "Try the portal");

        let calls = ai.calls();
        assert!(matches!(calls[0], MockAICall::Classify { .. }));
        assert!(matches!(calls[1], MockAICall::Generate { .. }));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let ai = MockAI::new();
        let handle = ai.clone();

        handle.set_embeddings_failing(true);
        assert!(ai.embed("x").await.is_err());
        assert_eq!(handle.embed_calls(), vec!["x".to_string()]);
    }
}
