//! Request processing pipeline.
//!
//! Stages, in order:
//! - [`classify`] - model classification with keyword fallback
//! - [`escalate`] - ordered escalation rules
//! - [`retrieve`] - category-first knowledge retrieval
//! - [`generate`] - response generation with canned fallback
//!
//! [`desk::HelpDesk`] ties them together.

pub mod classify;
pub mod desk;
pub mod escalate;
pub mod generate;
pub mod keywords;
pub mod prompts;
pub mod retrieve;

pub use classify::{classify, classify_by_keywords, FALLBACK_CONFIDENCE_CEILING};
pub use desk::{HelpDesk, HelpDeskStats};
pub use escalate::Escalator;
pub use keywords::PhraseSet;
pub use retrieve::retrieve;
