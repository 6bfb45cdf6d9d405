//! Reading molecules from files.
//!
//! The resolver works on any [`MoleculeGraph`](crate::core::models::molecule::MoleculeGraph)
//! a caller builds; this module provides a trait-based reader interface and
//! a BGF implementation for command-line use.

pub mod bgf;
pub mod traits;
