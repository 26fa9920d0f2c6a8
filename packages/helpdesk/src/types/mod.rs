//! Data types for the help desk pipeline.

pub mod category;
pub mod classification;
pub mod config;
pub mod escalation;
pub mod knowledge;
pub mod request;
pub mod response;
