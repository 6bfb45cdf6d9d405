use super::config::{ResolverConfig, UnassignedPolicy};
use super::error::{AmbiguousParameterError, ResolutionError, UnassignedInteractionWarning};
use super::matcher::{MatchMapping, SubstructureMatcher};
use super::resolved::{Provenance, ResolvedParameter, ResolvedParameterSet};
use crate::core::library::entry::Coefficients;
use crate::core::library::record::SubstructureRecord;
use crate::core::library::substructures::Library;
use crate::core::models::ids::AtomId;
use crate::core::models::interaction::{InteractionKey, InteractionKind};
use crate::core::models::molecule::MoleculeGraph;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One substructure entry that applies to one interaction.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    record: usize,
    entry: usize,
    specificity: usize,
    coefficients: Coefficients,
}

/// Assigns bonded parameters to every interaction of a molecule.
pub struct Resolver<'a> {
    library: &'a Library,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(library: &'a Library, config: &'a ResolverConfig) -> Self {
        Self { library, config }
    }

    /// Resolves the parameters of `molecule`.
    ///
    /// Ambiguous and unassigned interactions are collected per interaction
    /// and do not stop the others from resolving.
    ///
    /// # Errors
    ///
    /// Fails for an empty molecule, and for any unassigned interaction when
    /// the configured policy is [`UnassignedPolicy::Fail`].
    pub fn resolve(&self, molecule: &MoleculeGraph) -> Result<ResolvedParameterSet, ResolutionError> {
        if molecule.is_empty() {
            return Err(ResolutionError::EmptyMolecule);
        }

        let interactions = molecule.interactions();
        let mut candidates = self.collect_candidates(molecule, &interactions);

        let mut result = ResolvedParameterSet::default();
        for key in interactions {
            let found = candidates.remove(&key).unwrap_or_default();
            self.resolve_interaction(molecule, key, found, &mut result);
        }

        info!(
            resolved = result.len(),
            ambiguous = result.ambiguous.len(),
            unassigned = result.unassigned.len(),
            "Parameter resolution finished"
        );

        if let (UnassignedPolicy::Fail, Some(first)) =
            (self.config.unassigned_policy, result.unassigned.first())
        {
            return Err(ResolutionError::Unassigned {
                count: result.unassigned.len(),
                first: first.clone(),
            });
        }
        Ok(result)
    }

    /// Matches every record and groups the applicable entries by interaction.
    fn collect_candidates(
        &self,
        molecule: &MoleculeGraph,
        interactions: &BTreeSet<InteractionKey>,
    ) -> BTreeMap<InteractionKey, Vec<Candidate>> {
        let records = self.library.records();

        #[cfg(not(feature = "parallel"))]
        let iterator = records.iter();

        #[cfg(feature = "parallel")]
        let iterator = records.par_iter();

        let per_record: Vec<Vec<(InteractionKey, Candidate)>> = iterator
            .map(|record| self.match_record(record, molecule, interactions))
            .collect();

        let mut grouped: BTreeMap<InteractionKey, Vec<Candidate>> = BTreeMap::new();
        for (key, candidate) in per_record.into_iter().flatten() {
            let list = grouped.entry(key).or_default();
            if !list
                .iter()
                .any(|c| c.record == candidate.record && c.entry == candidate.entry)
            {
                list.push(candidate);
            }
        }
        grouped
    }

    fn match_record(
        &self,
        record: &SubstructureRecord,
        molecule: &MoleculeGraph,
        interactions: &BTreeSet<InteractionKey>,
    ) -> Vec<(InteractionKey, Candidate)> {
        let registry = self.library.registry();
        let mappings = SubstructureMatcher::new(registry, molecule)
            .with_limit(self.config.max_mappings_per_record)
            .find_all(&record.pattern);
        debug!(record = %record.label, mappings = mappings.len(), "Matched substructure");

        let mut found = Vec::new();
        for mapping in &mappings {
            match self.mapping_candidates(record, mapping, molecule, interactions) {
                Some(candidates) => found.extend(candidates),
                None => debug!(
                    record = %record.label,
                    "Mapping skipped: alternate indices name a different interaction"
                ),
            }
        }
        found
    }

    /// Applies one mapping to the record's entries. Returns `None` when an
    /// entry's alternate assignment does not land on the same interaction as
    /// its primary one, which invalidates the mapping for this record.
    fn mapping_candidates(
        &self,
        record: &SubstructureRecord,
        mapping: &MatchMapping,
        molecule: &MoleculeGraph,
        interactions: &BTreeSet<InteractionKey>,
    ) -> Option<Vec<(InteractionKey, Candidate)>> {
        let registry = self.library.registry();
        let mut candidates = Vec::new();

        for (index, entry) in record.entries.iter().enumerate() {
            let atoms = mapping.map_indices(&entry.indices)?;
            let key = InteractionKey::new(entry.kind, atoms.clone());
            if let Some(alternate) = &entry.alternate {
                let alternate_key = InteractionKey::new(entry.kind, mapping.map_indices(alternate)?);
                if alternate_key != key {
                    return None;
                }
            }
            if !interactions.contains(&key) {
                continue;
            }
            let types = atom_types(molecule, &atoms)?;
            if !entry.literals_match(registry, &types) {
                continue;
            }
            candidates.push((
                key,
                Candidate {
                    record: record.order,
                    entry: index,
                    specificity: entry.specificity(),
                    coefficients: entry.coefficients,
                },
            ));
        }
        Some(candidates)
    }

    fn resolve_interaction(
        &self,
        molecule: &MoleculeGraph,
        key: InteractionKey,
        mut candidates: Vec<Candidate>,
        result: &mut ResolvedParameterSet,
    ) {
        let registry = self.library.registry();
        let default = atom_types(molecule, key.atoms()).and_then(|types| {
            self.library
                .defaults()
                .lookup(registry, key.kind(), &types)
        });

        if key.kind() == InteractionKind::Torsion
            && default.is_some_and(|(_, row)| !row.coefficients.is_zero_torsion())
        {
            candidates.retain(|c| !c.coefficients.is_zero_torsion());
        }

        let Some(best) = candidates
            .iter()
            .map(|c| (c.specificity, c.record))
            .max()
        else {
            match default {
                Some((row, default_row)) => {
                    result.parameters.insert(
                        key,
                        ResolvedParameter {
                            coefficients: default_row.coefficients,
                            provenance: Provenance::LibraryDefault { row },
                            specificity: 0,
                        },
                    );
                }
                None => {
                    let warning = UnassignedInteractionWarning {
                        kind: key.kind(),
                        atoms: atom_names(molecule, key.atoms()),
                        key,
                    };
                    warn!(interaction = %warning, "Interaction left unassigned");
                    result.unassigned.push(warning);
                }
            }
            return;
        };

        let mut tied: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| (c.specificity, c.record) == best)
            .collect();
        tied.sort_by_key(|c| c.entry);

        let winner = tied[0];
        let (specificity, record_order) = best;
        let Some(record) = self.library.record(record_order) else {
            return;
        };

        if tied.len() > 1 {
            let error = AmbiguousParameterError {
                kind: key.kind(),
                atoms: atom_names(molecule, key.atoms()),
                key,
                record: record_order,
                label: record.label.clone(),
                entries: tied.iter().map(|c| c.entry).collect(),
            };
            warn!(%error, "Ambiguous parameter");
            result.ambiguous.push(error);
            return;
        }

        let line = record.entry(winner.entry).map_or(record.line, |e| e.line);
        result.parameters.insert(
            key,
            ResolvedParameter {
                coefficients: winner.coefficients,
                provenance: Provenance::Substructure {
                    record: record_order,
                    label: record.label.clone(),
                    entry: winner.entry,
                    line,
                },
                specificity,
            },
        );
    }
}

fn atom_types<'m>(molecule: &'m MoleculeGraph, atoms: &[AtomId]) -> Option<Vec<&'m str>> {
    atoms.iter().map(|&id| molecule.atom_type(id)).collect()
}

fn atom_names(molecule: &MoleculeGraph, atoms: &[AtomId]) -> Vec<String> {
    atoms
        .iter()
        .map(|&id| molecule.atom(id).map_or_else(String::new, |a| a.name.clone()))
        .collect()
}
