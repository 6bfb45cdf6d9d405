use crate::core::models::interaction::{InteractionKey, InteractionKind};
use thiserror::Error;

/// Two or more entries of one record tie on every override rule. Scoped to
/// one interaction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Ambiguous {kind} parameters for atoms [{}]: entries {entries:?} of record '{label}' tie",
    .atoms.join(", ")
)]
pub struct AmbiguousParameterError {
    pub key: InteractionKey,
    pub kind: InteractionKind,
    /// Names of the interaction's atoms, in key order.
    pub atoms: Vec<String>,
    pub record: usize,
    pub label: String,
    /// Indices of the tied entries within the record.
    pub entries: Vec<usize>,
}

/// An interaction with neither a substructure entry nor a library default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No parameters for {kind} [{}]", .atoms.join(", "))]
pub struct UnassignedInteractionWarning {
    pub key: InteractionKey,
    pub kind: InteractionKind,
    pub atoms: Vec<String>,
}

/// Failures that abort the resolution of a whole molecule.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Molecule has no atoms")]
    EmptyMolecule,
    #[error("{count} interaction(s) have no parameters; first: {first}")]
    Unassigned {
        count: usize,
        first: UnassignedInteractionWarning,
    },
}
