use super::ids::AtomId;
use super::interaction::{InteractionKey, InteractionKind};
use super::topology::{Bond, BondOrder};
use itertools::Itertools;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::BTreeSet;
use thiserror::Error;

/// An atom of a caller-supplied molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    /// The name of the atom (e.g., "RH1", "H7").
    pub name: String,
    /// The concrete force-field atom type (e.g., "C2", "H7", "Rh").
    pub atom_type: String,
}

impl Atom {
    pub fn new(name: &str, atom_type: &str) -> Self {
        Self {
            name: name.to_string(),
            atom_type: atom_type.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond references an atom that is not part of the molecule")]
    UnknownAtom,
    #[error("Atom '{name}' cannot be bonded to itself")]
    SelfBond { name: String },
    #[error("Duplicate bond between atoms '{first}' and '{second}'")]
    DuplicateBond { first: String, second: String },
}

/// The molecular graph a substructure library is matched against.
///
/// Nodes are atoms carrying a concrete atom type, edges are bonds carrying a
/// concrete bond order. The graph is owned by the caller and is only ever read
/// during matching and resolution.
#[derive(Debug, Clone, Default)]
pub struct MoleculeGraph {
    /// Primary storage for atoms using a slot map for stable IDs.
    atoms: SlotMap<AtomId, Atom>,
    /// List of all bonds in insertion order.
    bonds: Vec<Bond>,
    /// Cached adjacency list, indexed by atom ID.
    adjacency: SecondaryMap<AtomId, Vec<(AtomId, BondOrder)>>,
}

impl MoleculeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns its ID.
    pub fn add_atom(&mut self, name: &str, atom_type: &str) -> AtomId {
        let id = self.atoms.insert(Atom::new(name, atom_type));
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Adds a bond between two existing atoms.
    ///
    /// # Errors
    ///
    /// Fails if either atom is unknown, if both IDs are the same atom, or if
    /// the two atoms are already bonded.
    pub fn add_bond(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
    ) -> Result<(), MoleculeError> {
        let (first, second) = match (self.atoms.get(atom1_id), self.atoms.get(atom2_id)) {
            (Some(a), Some(b)) => (a.name.clone(), b.name.clone()),
            _ => return Err(MoleculeError::UnknownAtom),
        };
        if atom1_id == atom2_id {
            return Err(MoleculeError::SelfBond { name: first });
        }
        if self.bond_order_between(atom1_id, atom2_id).is_some() {
            return Err(MoleculeError::DuplicateBond { first, second });
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        if let Some(list) = self.adjacency.get_mut(atom1_id) {
            list.push((atom2_id, order));
        }
        if let Some(list) = self.adjacency.get_mut(atom2_id) {
            list.push((atom1_id, order));
        }
        Ok(())
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Returns the concrete atom type of an atom, if it exists.
    pub fn atom_type(&self, id: AtomId) -> Option<&str> {
        self.atoms.get(id).map(|a| a.atom_type.as_str())
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Bonded neighbors of an atom together with the order of each bond.
    pub fn neighbors(&self, id: AtomId) -> &[(AtomId, BondOrder)] {
        self.adjacency.get(id).map_or(&[], |v| v.as_slice())
    }

    pub fn degree(&self, id: AtomId) -> usize {
        self.neighbors(id).len()
    }

    /// Orders of every bond present between two atoms.
    pub fn orders_between(&self, a: AtomId, b: AtomId) -> impl Iterator<Item = BondOrder> + '_ {
        self.neighbors(a)
            .iter()
            .filter(move |(partner, _)| *partner == b)
            .map(|(_, order)| *order)
    }

    pub fn bond_order_between(&self, a: AtomId, b: AtomId) -> Option<BondOrder> {
        self.orders_between(a, b).next()
    }

    pub fn are_bonded(&self, a: AtomId, b: AtomId) -> bool {
        self.bond_order_between(a, b).is_some()
    }

    /// Enumerates every bonded interaction of the molecule.
    ///
    /// Bonds come from the edge list, angles from every pair of neighbors
    /// around a central atom and proper torsions from every bond with one
    /// further neighbor on each side. Keys are canonical, so each physical
    /// interaction appears exactly once.
    pub fn interactions(&self) -> BTreeSet<InteractionKey> {
        let mut keys = BTreeSet::new();

        for bond in &self.bonds {
            keys.insert(InteractionKey::new(
                InteractionKind::Bond,
                vec![bond.atom1_id, bond.atom2_id],
            ));
        }

        for (center, _) in self.atoms.iter() {
            for pair in self.neighbors(center).iter().combinations(2) {
                keys.insert(InteractionKey::new(
                    InteractionKind::Angle,
                    vec![pair[0].0, center, pair[1].0],
                ));
            }
        }

        for bond in &self.bonds {
            let (j, k) = (bond.atom1_id, bond.atom2_id);
            for &(i, _) in self.neighbors(j) {
                if i == k {
                    continue;
                }
                for &(l, _) in self.neighbors(k) {
                    if l == j || l == i {
                        continue;
                    }
                    keys.insert(InteractionKey::new(
                        InteractionKind::Torsion,
                        vec![i, j, k, l],
                    ));
                }
            }
        }

        keys
    }
}
