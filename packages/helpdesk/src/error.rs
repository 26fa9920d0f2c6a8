//! Typed errors for the help desk library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while processing requests.
///
/// None of these escape [`HelpDesk::process`](crate::HelpDesk::process):
/// per-request failures are mapped onto degraded stage outcomes. They surface
/// from the lower-level building blocks and from startup.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// Completion or embedding provider failed
    #[error("AI service error: {0}")]
    AI(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// External call exceeded its deadline
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// Classifier answered with a category outside the configured set
    #[error("category not in configured set: {name}")]
    UnknownCategory { name: String },

    /// Provider output could not be interpreted
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Reading knowledge files failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Startup configuration is invalid
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Configuration problems detected at startup.
///
/// These are fatal: a process that hits one should refuse to serve.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Category set is empty
    #[error("no categories configured")]
    NoCategories,

    /// Category with a blank name
    #[error("category name must not be empty")]
    EmptyCategoryName,

    /// Two categories share a name
    #[error("duplicate category: {name}")]
    DuplicateCategory { name: String },

    /// Default category is not part of the set
    #[error("default category not in set: {name}")]
    UnknownDefaultCategory { name: String },

    /// No chunks to index
    #[error("knowledge base is empty")]
    EmptyKnowledgeBase,

    /// Two chunks share an id
    #[error("duplicate chunk id: {id}")]
    DuplicateChunk { id: String },

    /// Chunk embedding has no components
    #[error("chunk {id} has an empty embedding")]
    EmptyEmbedding { id: String },

    /// Chunk embedding length differs from the rest of the index
    #[error("chunk {id} has dimension {found}, index uses {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    /// Provider returned a different number of embeddings than requested
    #[error("expected {expected} embeddings, provider returned {found}")]
    EmbeddingCount { expected: usize, found: usize },

    /// Numeric setting out of range
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Result type alias for help desk operations.
pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
