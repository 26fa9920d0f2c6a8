//! Core trait abstractions for the help desk library.
//!
//! These traits define the interfaces that applications implement
//! to provide completion and embedding capabilities.

pub mod ai;
