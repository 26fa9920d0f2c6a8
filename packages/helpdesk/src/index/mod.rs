//! Knowledge index and similarity scoring.

pub mod knowledge;
pub mod shared;
pub mod similarity;

pub use knowledge::KnowledgeIndex;
pub use shared::SharedIndex;
pub use similarity::cosine_similarity;
