use super::error::{AmbiguousParameterError, UnassignedInteractionWarning};
use crate::core::library::entry::Coefficients;
use crate::core::models::ids::AtomId;
use crate::core::models::interaction::{InteractionKey, InteractionKind};
use std::collections::BTreeMap;
use std::fmt;

/// Where a resolved parameter came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// An entry of a substructure record.
    Substructure {
        /// Load position of the record.
        record: usize,
        label: String,
        /// Index of the entry within the record.
        entry: usize,
        /// Source line of the entry.
        line: usize,
    },
    /// A row of the library default table.
    LibraryDefault { row: usize },
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substructure {
                label, entry, line, ..
            } => write!(f, "'{}' entry {} (line {})", label, entry, line),
            Self::LibraryDefault { row } => write!(f, "default row {}", row),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameter {
    pub coefficients: Coefficients,
    pub provenance: Provenance,
    /// Number of literal type constraints on the winning entry.
    pub specificity: usize,
}

/// The outcome of resolving one molecule: one parameter per interaction that
/// could be assigned, plus the interactions that could not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameterSet {
    pub(crate) parameters: BTreeMap<InteractionKey, ResolvedParameter>,
    pub(crate) ambiguous: Vec<AmbiguousParameterError>,
    pub(crate) unassigned: Vec<UnassignedInteractionWarning>,
}

impl ResolvedParameterSet {
    pub fn get(&self, key: &InteractionKey) -> Option<&ResolvedParameter> {
        self.parameters.get(key)
    }

    /// Looks up an interaction by its atoms, in either direction.
    pub fn find(&self, kind: InteractionKind, atoms: &[AtomId]) -> Option<&ResolvedParameter> {
        self.get(&InteractionKey::new(kind, atoms.to_vec()))
    }

    /// Resolved parameters in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (&InteractionKey, &ResolvedParameter)> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn ambiguous(&self) -> &[AmbiguousParameterError] {
        &self.ambiguous
    }

    pub fn unassigned(&self) -> &[UnassignedInteractionWarning] {
        &self.unassigned
    }

    /// True when every interaction received exactly one parameter.
    pub fn is_complete(&self) -> bool {
        self.ambiguous.is_empty() && self.unassigned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_names_its_source() {
        let substructure = Provenance::Substructure {
            record: 0,
            label: "RH-PX".to_string(),
            entry: 2,
            line: 41,
        };
        assert_eq!(substructure.to_string(), "'RH-PX' entry 2 (line 41)");
        assert_eq!(
            Provenance::LibraryDefault { row: 3 }.to_string(),
            "default row 3"
        );
    }

    #[test]
    fn empty_set_is_complete() {
        let set = ResolvedParameterSet::default();
        assert!(set.is_empty());
        assert!(set.is_complete());
    }
}
