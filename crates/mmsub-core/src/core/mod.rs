//! # Core Module
//!
//! Fundamental, stateless building blocks shared by the matcher and the
//! resolver.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, bond orders and
//!   bonded-interaction keys of a caller-supplied molecule
//! - **Atom Types** ([`types`]) - The atom-type registry with wildcards and
//!   equivalence classes
//! - **Pattern Language** ([`pattern`]) - Tokenizer and parser turning a
//!   substructure pattern string into a labeled graph
//! - **Substructure Library** ([`library`]) - Parsed substructure records,
//!   parameter entries and library default parameters
//! - **File I/O** ([`io`]) - Reading molecules from BGF files
//!
//! Everything in this module is immutable once built and can be shared
//! freely across threads.

pub mod io;
pub mod library;
pub mod models;
pub mod pattern;
pub mod types;
