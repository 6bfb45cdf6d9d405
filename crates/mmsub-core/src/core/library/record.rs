use super::entry::ParameterEntry;
use crate::core::pattern::graph::PatternGraph;

/// One parsed substructure: a labeled pattern and its parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubstructureRecord {
    /// Text of the record's header line.
    pub label: String,
    /// Declared number of pattern atoms.
    pub atom_count: usize,
    pub pattern: PatternGraph,
    /// Entries in the order they were written.
    pub entries: Vec<ParameterEntry>,
    /// Position of the record in the library, counting only loaded records.
    pub order: usize,
    /// Line of the record's header.
    pub line: usize,
}

impl SubstructureRecord {
    pub fn entry(&self, index: usize) -> Option<&ParameterEntry> {
        self.entries.get(index)
    }
}
