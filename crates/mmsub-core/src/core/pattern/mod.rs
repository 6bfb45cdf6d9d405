//! # Pattern Module
//!
//! The substructure pattern language and its parser.
//!
//! A pattern is a chain of atom-type symbols joined by explicit bond
//! operators, with parenthesized branches and `%k` back-references that bond
//! the current atom to an already declared local index. Atoms receive local
//! indices 1..N in order of appearance.
//!
//! | syntax        | meaning                                            |
//! |---------------|----------------------------------------------------|
//! | `Rh`, `HX`    | atom-type symbol, class name, or the wildcard `00` |
//! | `-` `=` `#` `:` | single, double, triple, aromatic-or-partial bond |
//! | `~`           | any bond order                                     |
//! | `{-:}`        | explicit set of accepted orders                    |
//! | `!`           | prefix: the bond must be absent                    |
//! | `(` ... `)`   | branch                                             |
//! | `%3`          | bond back to local atom 3                          |
//!
//! Example: `Rh(-HX)(-PX)(-PX)(-HX){-:}C2(:HX:%1){=:}C2-C3` declares nine atoms.
//!
//! - [`token`] - Converts pattern text into a tagged token stream
//! - [`graph`] - Builds the [`graph::PatternGraph`] from the token stream
//! - [`error`] - Syntax errors

pub mod error;
pub mod graph;
pub mod token;
