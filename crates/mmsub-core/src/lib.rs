//! # mmsub Core Library
//!
//! Substructure pattern matching and bonded-parameter resolution for
//! molecular-mechanics force fields.
//!
//! A force field may ship *substructure* sections: small atom-type patterns,
//! each carrying bond-stretch, angle-bend and torsion parameters that apply
//! wherever the pattern occurs in a molecule. This library loads such
//! sections, finds every occurrence of every pattern in a caller-supplied
//! molecular graph and decides, for each bonded interaction, which parameter
//! set wins.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Immutable data models: the molecular graph,
//!   the atom-type registry, the pattern language and the substructure library
//!   with its text-format reader.
//!
//! - **[`engine`]: The Logic Core.** The exhaustive substructure matcher and the
//!   parameter resolver with its override rules, plus their configuration and
//!   error types.
//!
//! - **[`workflows`]: The Public API.** Entry points that tie loading and
//!   resolution together, including batch resolution of many molecules.

pub mod core;
pub mod engine;
pub mod workflows;
