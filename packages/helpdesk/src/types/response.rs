//! Pipeline output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::{ClassificationMode, ClassificationResult};
use super::escalation::EscalationVerdict;
use super::knowledge::RetrievedItem;

/// How evidence was ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Cosine similarity over embeddings
    Semantic,

    /// Term overlap, used when the query could not be embedded
    Keyword,
}

/// Outcome of the response generation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Generation {
    /// The model produced a response
    Generated { text: String },

    /// Generation failed; `fallback_text` is a canned reply for the category
    Unavailable { reason: String, fallback_text: String },
}

impl Generation {
    /// Text to show the requester, whichever way it was produced.
    pub fn text(&self) -> &str {
        match self {
            Generation::Generated { text } => text,
            Generation::Unavailable { fallback_text, .. } => fallback_text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Generation::Generated { .. })
    }
}

/// Everything the pipeline produced for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub request_id: Uuid,

    pub classification: ClassificationResult,

    /// Whether classification was degraded
    pub classification_mode: ClassificationMode,

    /// Supporting evidence, best first
    pub knowledge: Vec<RetrievedItem>,

    pub retrieval_mode: RetrievalMode,

    pub response: Generation,

    pub escalation: EscalationVerdict,

    pub processing_time_ms: u64,

    pub created_at: DateTime<Utc>,
}
