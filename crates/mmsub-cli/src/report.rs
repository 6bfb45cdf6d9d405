use mmsub::core::models::interaction::InteractionKind;
use mmsub::core::models::molecule::MoleculeGraph;
use mmsub::engine::error::ResolutionError;
use mmsub::engine::resolved::ResolvedParameterSet;
use serde::Serialize;
use std::path::Path;

/// The TOML document written by `mmsub resolve`.
#[derive(Serialize, Debug, Default)]
pub struct Report {
    pub molecule: Vec<MoleculeReport>,
}

#[derive(Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Complete,
    Incomplete,
    Failed,
}

#[derive(Serialize, Debug)]
pub struct MoleculeReport {
    pub path: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ambiguous: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<ParameterRow>,
}

#[derive(Serialize, Debug)]
pub struct ParameterRow {
    pub kind: InteractionKind,
    pub atoms: Vec<String>,
    pub types: Vec<String>,
    pub values: Vec<f64>,
    pub source: String,
    pub specificity: usize,
}

impl MoleculeReport {
    pub fn new(
        path: &Path,
        molecule: &MoleculeGraph,
        result: &Result<ResolvedParameterSet, ResolutionError>,
    ) -> Self {
        let path = path.display().to_string();
        let set = match result {
            Ok(set) => set,
            Err(e) => {
                return Self {
                    path,
                    status: Status::Failed,
                    error: Some(e.to_string()),
                    ambiguous: Vec::new(),
                    unassigned: Vec::new(),
                    parameter: Vec::new(),
                };
            }
        };

        let parameter = set
            .iter()
            .map(|(key, resolved)| {
                let (atoms, types) = key
                    .atoms()
                    .iter()
                    .filter_map(|&id| molecule.atom(id))
                    .map(|atom| (atom.name.clone(), atom.atom_type.clone()))
                    .unzip();
                ParameterRow {
                    kind: key.kind(),
                    atoms,
                    types,
                    values: resolved.coefficients.values(),
                    source: resolved.provenance.to_string(),
                    specificity: resolved.specificity,
                }
            })
            .collect();

        Self {
            path,
            status: if set.is_complete() {
                Status::Complete
            } else {
                Status::Incomplete
            },
            error: None,
            ambiguous: set.ambiguous().iter().map(ToString::to_string).collect(),
            unassigned: set.unassigned().iter().map(ToString::to_string).collect(),
            parameter,
        }
    }
}

impl Report {
    pub fn failed_count(&self) -> usize {
        self.molecule
            .iter()
            .filter(|m| m.status == Status::Failed)
            .count()
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
