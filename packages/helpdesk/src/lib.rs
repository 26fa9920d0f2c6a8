//! Help Desk Request Pipeline
//!
//! Routes free-text support requests through classification, knowledge
//! retrieval, escalation and response generation.
//!
//! # Design Philosophy
//!
//! - Categories are validated runtime data, not a hard-coded enum
//! - Model output is validated at the boundary, never trusted
//! - Degraded stages are tagged in the result, not thrown
//! - Escalation is pure and deterministic
//!
//! # Usage
//!
//! ```rust,ignore
//! use helpdesk::{CategorySet, HelpDesk, KnowledgeLoader, SupportRequest};
//! use helpdesk::testing::MockAI;
//!
//! let loaded = KnowledgeLoader::new("data").load()?;
//! let categories = loaded.category_set("policy_question")?;
//! let desk = HelpDesk::new(MockAI::new(), categories, loaded.chunks).await?;
//!
//! let result = desk.process(SupportRequest::new("I forgot my password")).await;
//! println!("{} -> {}", result.classification.category, result.response.text());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Completion and embedding abstractions
//! - [`types`] - Categories, requests, results, configuration
//! - [`index`] - Knowledge index and similarity scoring
//! - [`pipeline`] - Classification, retrieval, escalation, generation
//! - [`loader`] - Data directory loading
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ConfigError, HelpdeskError, Result};
pub use index::{KnowledgeIndex, SharedIndex};
pub use loader::{KnowledgeLoader, LoadedKnowledge};
pub use pipeline::{Escalator, HelpDesk, HelpDeskStats, FALLBACK_CONFIDENCE_CEILING};
pub use traits::ai::{EmbeddingModel, LanguageModel, AI};
pub use types::{
    category::{CategoryDefinition, CategorySet, DEFAULT_CATEGORY},
    classification::{ClassificationMode, ClassificationOutcome, ClassificationResult},
    config::{EscalationPolicy, PipelineConfig},
    escalation::{EscalationRule, EscalationVerdict, Urgency},
    knowledge::{KnowledgeChunk, RawChunk, RetrievedItem},
    request::{Priority, SupportRequest},
    response::{Generation, PipelineResult, RetrievalMode},
};
