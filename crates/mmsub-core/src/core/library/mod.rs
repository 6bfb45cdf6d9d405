//! # Library Module
//!
//! The substructure library: parsed records with their parameter tables,
//! the text-format reader that produces them, and the default parameter
//! table that applies where no substructure does.
//!
//! - [`substructures`] - The [`substructures::Library`] container and its loaders
//! - [`record`] / [`entry`] - Substructure records and their parameter entries
//! - [`defaults`] - Library default parameters keyed by atom-type tuples
//! - [`error`] - Per-line load errors and fatal load failures

pub mod defaults;
pub mod entry;
pub mod error;
mod format;
pub mod record;
pub mod substructures;
