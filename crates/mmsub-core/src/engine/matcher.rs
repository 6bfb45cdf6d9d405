use crate::core::models::ids::AtomId;
use crate::core::models::molecule::MoleculeGraph;
use crate::core::pattern::graph::{PatternAtom, PatternGraph};
use crate::core::types::registry::AtomTypeRegistry;

/// An injective assignment of pattern atoms to molecule atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchMapping {
    atoms: Vec<AtomId>,
}

impl MatchMapping {
    /// The molecule atom assigned to a 1-based local index.
    pub fn get(&self, local: usize) -> Option<AtomId> {
        local.checked_sub(1).and_then(|i| self.atoms.get(i)).copied()
    }

    /// Molecule atoms in local-index order.
    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Maps a tuple of local indices onto molecule atoms.
    pub fn map_indices(&self, locals: &[usize]) -> Option<Vec<AtomId>> {
        locals.iter().map(|&l| self.get(l)).collect()
    }
}

/// Enumerates occurrences of substructure patterns in one molecule.
///
/// The search is a backtracking subgraph match. At each step it extends the
/// pattern atom with the fewest feasible candidates left, checking atom
/// types through the registry and every relation to already mapped atoms.
pub struct SubstructureMatcher<'a> {
    registry: &'a AtomTypeRegistry,
    molecule: &'a MoleculeGraph,
    limit: Option<usize>,
}

struct Search<'a, 'p> {
    matcher: &'a SubstructureMatcher<'a>,
    pattern: &'p PatternGraph,
    candidates: Vec<Vec<AtomId>>,
    assigned: Vec<Option<AtomId>>,
    results: Vec<MatchMapping>,
}

impl<'a> SubstructureMatcher<'a> {
    pub fn new(registry: &'a AtomTypeRegistry, molecule: &'a MoleculeGraph) -> Self {
        Self {
            registry,
            molecule,
            limit: None,
        }
    }

    /// Stops the enumeration after `limit` mappings.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Finds every mapping of `pattern` into the molecule, in a deterministic
    /// order. An empty result means the pattern does not occur.
    pub fn find_all(&self, pattern: &PatternGraph) -> Vec<MatchMapping> {
        if pattern.is_empty() || pattern.len() > self.molecule.atom_count() {
            return Vec::new();
        }

        let candidates: Vec<Vec<AtomId>> = pattern
            .atoms()
            .iter()
            .map(|atom| self.initial_candidates(atom))
            .collect();
        if candidates.iter().any(Vec::is_empty) {
            return Vec::new();
        }

        let mut search = Search {
            matcher: self,
            pattern,
            candidates,
            assigned: vec![None; pattern.len()],
            results: Vec::new(),
        };
        search.recurse();
        search.results
    }

    fn initial_candidates(&self, atom: &PatternAtom) -> Vec<AtomId> {
        let required = atom.required_degree();
        self.molecule
            .atoms_iter()
            .filter(|(id, a)| {
                self.registry.matches(&atom.atom_type, &a.atom_type)
                    && self.molecule.degree(*id) >= required
            })
            .map(|(id, _)| id)
            .collect()
    }
}

impl Search<'_, '_> {
    fn done(&self) -> bool {
        self.matcher
            .limit
            .is_some_and(|limit| self.results.len() >= limit)
    }

    fn recurse(&mut self) {
        let Some((slot, feasible)) = self.select_next() else {
            let atoms = self.assigned.iter().flatten().copied().collect();
            self.results.push(MatchMapping { atoms });
            return;
        };

        for candidate in feasible {
            self.assigned[slot] = Some(candidate);
            self.recurse();
            self.assigned[slot] = None;
            if self.done() {
                return;
            }
        }
    }

    /// Picks the unassigned pattern atom with the fewest feasible candidates.
    /// Returns `None` once every atom is assigned.
    fn select_next(&self) -> Option<(usize, Vec<AtomId>)> {
        let mut best: Option<(usize, Vec<AtomId>)> = None;
        for slot in (0..self.assigned.len()).filter(|&s| self.assigned[s].is_none()) {
            let feasible: Vec<AtomId> = self.candidates[slot]
                .iter()
                .copied()
                .filter(|&c| self.is_feasible(slot, c))
                .collect();
            let better = best
                .as_ref()
                .is_none_or(|(_, current)| feasible.len() < current.len());
            if better {
                let exhausted = feasible.is_empty();
                best = Some((slot, feasible));
                if exhausted {
                    break;
                }
            }
        }
        best
    }

    fn is_feasible(&self, slot: usize, candidate: AtomId) -> bool {
        if self.assigned.contains(&Some(candidate)) {
            return false;
        }
        let molecule = self.matcher.molecule;
        self.pattern.atoms()[slot].relations.iter().all(|relation| {
            let Some(partner) = self.assigned[relation.partner - 1] else {
                return true;
            };
            let mut orders = molecule.orders_between(candidate, partner);
            if relation.excluded {
                !orders.any(|o| relation.orders.contains(o))
            } else {
                orders.any(|o| relation.orders.contains(o))
            }
        })
    }
}
