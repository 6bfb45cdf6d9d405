//! # Engine Module
//!
//! The matching and resolution machinery that turns a substructure library
//! and a molecule into a set of bonded parameters.
//!
//! ## Overview
//!
//! Resolution runs in two stages. The [`matcher`] enumerates every occurrence
//! of every substructure pattern in the molecule. The [`resolver`] then maps
//! each record's parameter entries through those occurrences and, for every
//! bond, angle and torsion of the molecule, picks one winner by the override
//! rules: more literal type constraints first, then later records, with
//! all-zero torsions never displacing a nonzero library default.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Mapping limits and the unassigned-interaction policy
//! - **Matching** ([`matcher`]) - Exhaustive backtracking subgraph search
//! - **Resolution** ([`resolver`], [`resolved`]) - Override rules and the resolved parameter set
//! - **Progress Monitoring** ([`progress`]) - Callbacks for batch resolution
//! - **Error Handling** ([`error`]) - Per-interaction and per-molecule failures

pub mod config;
pub mod error;
pub mod matcher;
pub mod progress;
pub mod resolved;
pub mod resolver;
