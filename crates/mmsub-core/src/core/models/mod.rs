//! Molecular graph models consumed by the matcher and the resolver.

pub mod ids;
pub mod interaction;
pub mod molecule;
pub mod topology;
