//! AI implementations for the help desk library.
//!
//! This module provides reference implementations of the completion and
//! embedding traits. Users can use these directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAI;
