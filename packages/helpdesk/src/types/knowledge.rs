//! Knowledge base types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A knowledge chunk before embedding, as produced by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChunk {
    /// Unique identifier
    pub id: String,

    /// Chunk text
    pub content: String,

    /// Document the chunk came from (file name, guide title)
    pub source: String,

    /// Category tags. Tags are not required to be members of the category
    /// set; untagged or unknown-tag chunks are only reached by widening.
    pub category_tags: BTreeSet<String>,
}

impl RawChunk {
    /// Create a chunk tagged with a single category.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source: source.into(),
            category_tags: BTreeSet::from([category.into()]),
        }
    }

    /// Add another category tag.
    pub fn with_tag(mut self, category: impl Into<String>) -> Self {
        self.category_tags.insert(category.into());
        self
    }

    /// Attach an embedding.
    pub fn embedded(self, embedding: Vec<f32>) -> KnowledgeChunk {
        KnowledgeChunk {
            id: self.id,
            content: self.content,
            source: self.source,
            category_tags: self.category_tags,
            embedding,
        }
    }
}

/// An indexed knowledge chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique identifier
    pub id: String,

    /// Chunk text
    pub content: String,

    /// Source document
    pub source: String,

    /// Category tags
    pub category_tags: BTreeSet<String>,

    /// Embedding vector (same dimension across the index)
    #[serde(default, skip_serializing)]
    pub embedding: Vec<f32>,
}

impl KnowledgeChunk {
    pub fn has_tag(&self, category: &str) -> bool {
        self.category_tags.contains(category)
    }
}

/// A chunk returned by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub chunk_id: String,
    pub source: String,
    pub content: String,

    /// Relevance in `[0, 1]`
    pub relevance_score: f32,
}

impl RetrievedItem {
    pub(crate) fn from_chunk(chunk: &KnowledgeChunk, relevance_score: f32) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            source: chunk.source.clone(),
            content: chunk.content.clone(),
            relevance_score,
        }
    }
}
