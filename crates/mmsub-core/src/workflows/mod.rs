//! # Workflows Module
//!
//! High-level entry points that tie library loading and parameter resolution
//! together.
//!
//! - **Resolution Workflow** ([`resolve`]) - Loading a library from disk,
//!   resolving one molecule, and resolving a batch of molecules against a
//!   shared library with progress reporting.

pub mod resolve;
