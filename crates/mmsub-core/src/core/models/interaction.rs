use super::ids::AtomId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of a bonded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Bond,
    Angle,
    Torsion,
}

impl InteractionKind {
    /// Number of atoms spanned by the interaction.
    pub fn arity(self) -> usize {
        match self {
            Self::Bond => 2,
            Self::Angle => 3,
            Self::Torsion => 4,
        }
    }

    /// Number of fitted coefficients carried by a parameter of this class.
    pub fn coefficient_count(self) -> usize {
        match self {
            Self::Bond | Self::Angle => 2,
            Self::Torsion => 3,
        }
    }

    /// The class digit used in substructure parameter lines.
    pub fn tag(self) -> u8 {
        match self {
            Self::Bond => 1,
            Self::Angle => 2,
            Self::Torsion => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Bond),
            2 => Some(Self::Angle),
            4 => Some(Self::Torsion),
            _ => None,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Bond => "bond",
                Self::Angle => "angle",
                Self::Torsion => "torsion",
            }
        )
    }
}

/// Identifies one physical bonded interaction in a molecule.
///
/// The atom tuple is stored in canonical direction: a tuple and its reverse
/// describe the same interaction, so the lexicographically smaller of the two
/// is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionKey {
    kind: InteractionKind,
    atoms: Vec<AtomId>,
}

impl InteractionKey {
    pub fn new(kind: InteractionKind, atoms: Vec<AtomId>) -> Self {
        let reversed: Vec<AtomId> = atoms.iter().rev().copied().collect();
        let atoms = if reversed < atoms { reversed } else { atoms };
        Self { kind, atoms }
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn tags_round_trip() {
        for kind in [
            InteractionKind::Bond,
            InteractionKind::Angle,
            InteractionKind::Torsion,
        ] {
            assert_eq!(InteractionKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(InteractionKind::from_tag(3), None);
    }

    #[test]
    fn arity_and_coefficient_counts() {
        assert_eq!(InteractionKind::Bond.arity(), 2);
        assert_eq!(InteractionKind::Angle.arity(), 3);
        assert_eq!(InteractionKind::Torsion.arity(), 4);
        assert_eq!(InteractionKind::Angle.coefficient_count(), 2);
        assert_eq!(InteractionKind::Torsion.coefficient_count(), 3);
    }

    #[test]
    fn key_is_canonical_under_reversal() {
        let a = InteractionKey::new(InteractionKind::Torsion, vec![id(4), id(3), id(2), id(1)]);
        let b = InteractionKey::new(InteractionKind::Torsion, vec![id(1), id(2), id(3), id(4)]);
        assert_eq!(a, b);
        assert_eq!(a.atoms(), &[id(1), id(2), id(3), id(4)]);
    }

    #[test]
    fn key_distinguishes_different_centers() {
        let a = InteractionKey::new(InteractionKind::Angle, vec![id(1), id(2), id(3)]);
        let b = InteractionKey::new(InteractionKind::Angle, vec![id(2), id(1), id(3)]);
        assert_ne!(a, b);
    }
}
