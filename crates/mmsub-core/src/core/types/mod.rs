//! # Atom Types Module
//!
//! Canonicalizes atom-type symbols for the pattern language and the matcher.
//!
//! The registry is a flat mapping: concrete types, the universal wildcard `00`,
//! and named equivalence classes such as `HX` (any of the seven hydrogen
//! subtypes). Whether a concrete type satisfies a pattern type is a single
//! capability check, [`registry::AtomTypeRegistry::matches`], rather than a
//! type hierarchy.
//!
//! ```ignore
//! use mmsub::core::types::registry::AtomTypeRegistry;
//!
//! let registry = AtomTypeRegistry::builtin();
//! let hx = registry.resolve("HX")?;
//! assert!(registry.matches(&hx, "H7"));
//! ```

pub(crate) mod builtin;
pub mod registry;
