//! Classification types.

use serde::{Deserialize, Serialize};

/// Category assigned to a request.
///
/// `category` is always a member of the configured category set and
/// `confidence` is always within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f32,
    pub reasoning: String,
}

/// Which path produced a classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Model classification succeeded
    Primary,

    /// Keyword heuristics were used; `cause` says why the model path failed
    Fallback { cause: String },
}

impl ClassificationMode {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ClassificationMode::Fallback { .. })
    }
}

/// A classification together with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub result: ClassificationResult,
    pub mode: ClassificationMode,
}

/// Shape the model is asked to answer with.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelClassification {
    pub category: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}
