use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    /// Aromatic or otherwise partial (delocalized, agostic, forming) bond.
    Aromatic,
}

impl BondOrder {
    pub const ALL: [BondOrder; 4] = [
        BondOrder::Single,
        BondOrder::Double,
        BondOrder::Triple,
        BondOrder::Aromatic,
    ];

    /// The operator character used for this order in substructure patterns.
    pub fn symbol(self) -> char {
        match self {
            Self::Single => '-',
            Self::Double => '=',
            Self::Triple => '#',
            Self::Aromatic => ':',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '-' => Some(Self::Single),
            '=' => Some(Self::Double),
            '#' => Some(Self::Triple),
            ':' => Some(Self::Aromatic),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "1.5" | "ar" | "aromatic" | "p" | "partial" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// The set of bond orders a pattern edge accepts.
///
/// Every pattern edge carries its own explicit set; there is no implicit
/// default order. A set is written in patterns either as one operator
/// (`-`, `=`, `#`, `:`), as `~` for any order, or as a braced list such as
/// `{-:}` for "single or partial".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BondOrderSet(u8);

impl BondOrderSet {
    pub const EMPTY: BondOrderSet = BondOrderSet(0);
    pub const ANY: BondOrderSet = BondOrderSet(0b1111);

    pub fn only(order: BondOrder) -> Self {
        Self(order.bit())
    }

    pub fn with(self, order: BondOrder) -> Self {
        Self(self.0 | order.bit())
    }

    pub fn union(self, other: BondOrderSet) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, order: BondOrder) -> bool {
        self.0 & order.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = BondOrder> {
        BondOrder::ALL.into_iter().filter(move |o| self.contains(*o))
    }
}

impl FromIterator<BondOrder> for BondOrderSet {
    fn from_iter<I: IntoIterator<Item = BondOrder>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, order| set.with(order))
    }
}

impl fmt::Display for BondOrderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ANY {
            return write!(f, "~");
        }
        let symbols: String = self.iter().map(BondOrder::symbol).collect();
        if symbols.len() == 1 {
            write!(f, "{}", symbols)
        } else {
            write!(f, "{{{}}}", symbols)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId, // ID of the first atom
    pub atom2_id: AtomId, // ID of the second atom
    pub order: BondOrder, // Bond order (e.g., single, double, etc.)
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Self {
        Self {
            atom1_id,
            atom2_id,
            order,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    pub fn connects(&self, a: AtomId, b: AtomId) -> bool {
        (self.atom1_id == a && self.atom2_id == b) || (self.atom1_id == b && self.atom2_id == a)
    }
}
