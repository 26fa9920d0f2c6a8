//! OpenAI implementation of the AI traits.
//!
//! A reference implementation using OpenAI chat completions and
//! text-embedding-3-small.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk::ai::OpenAI;
//!
//! let ai = OpenAI::new("sk-...").with_model("gpt-4o");
//! let desk = HelpDesk::new(ai, CategorySet::help_desk_defaults(), chunks).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};
use crate::traits::ai::{EmbeddingModel, LanguageModel};

/// Inputs per embeddings request.
const EMBEDDING_BATCH_SIZE: usize = 256;

/// OpenAI-based AI implementation.
#[derive(Clone)]
pub struct OpenAI {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAI {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.1,
            max_tokens: 800,
        }
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature (default: 0.1).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token limit (default: 800).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the embedding model name.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpdeskError::AI(e.to_string().into()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HelpdeskError::AI(
                format!("OpenAI API error: {}", error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| HelpdeskError::AI(e.to_string().into()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| HelpdeskError::AI("No response from OpenAI".into()))
    }

    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.iter().map(|t| t.to_string()).collect(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpdeskError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HelpdeskError::Embedding(format!(
                "OpenAI embedding error: {}",
                error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| HelpdeskError::Embedding(e.to_string()))?;

        Ok(order_embeddings(embedding_response.data))
    }
}

/// Put embeddings back in request order.
fn order_embeddings(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl LanguageModel for OpenAI {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(system, prompt).await
    }
}

#[async_trait]
impl EmbeddingModel for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HelpdeskError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH_SIZE) {
            results.extend(self.embed_texts(batch).await?);
        }
        Ok(results)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_embedding_model("text-embedding-3-large")
            .with_base_url("https://custom.api.com/");

        assert_eq!(ai.model, "gpt-4o-mini");
        assert_eq!(ai.embedding_model, "text-embedding-3-large");
        assert_eq!(ai.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_embeddings_reordered_by_index() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            order_embeddings(response.data),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
    }
}
