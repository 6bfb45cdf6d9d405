use crate::core::models::interaction::InteractionKind;
use crate::core::types::registry::{AtomTypeRegistry, TypePattern};
use serde::Serialize;

/// Fitted coefficients of one bonded parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coefficients {
    /// Equilibrium length (Å) and stretch force constant.
    Bond { length: f64, force_constant: f64 },
    /// Equilibrium angle (degrees) and bend force constant.
    Angle { angle: f64, force_constant: f64 },
    /// Fourier torsion coefficients.
    Torsion { v1: f64, v2: f64, v3: f64 },
}

impl Coefficients {
    /// Builds coefficients of the given class from a value slice of the exact
    /// length the class requires.
    pub fn from_values(kind: InteractionKind, values: &[f64]) -> Option<Self> {
        match (kind, values) {
            (InteractionKind::Bond, &[length, force_constant]) => Some(Self::Bond {
                length,
                force_constant,
            }),
            (InteractionKind::Angle, &[angle, force_constant]) => Some(Self::Angle {
                angle,
                force_constant,
            }),
            (InteractionKind::Torsion, &[v1, v2, v3]) => Some(Self::Torsion { v1, v2, v3 }),
            _ => None,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Bond { .. } => InteractionKind::Bond,
            Self::Angle { .. } => InteractionKind::Angle,
            Self::Torsion { .. } => InteractionKind::Torsion,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match *self {
            Self::Bond {
                length,
                force_constant,
            } => vec![length, force_constant],
            Self::Angle {
                angle,
                force_constant,
            } => vec![angle, force_constant],
            Self::Torsion { v1, v2, v3 } => vec![v1, v2, v3],
        }
    }

    /// True for a torsion whose three Fourier coefficients are exactly zero.
    pub fn is_zero_torsion(&self) -> bool {
        matches!(*self, Self::Torsion { v1, v2, v3 } if v1 == 0.0 && v2 == 0.0 && v3 == 0.0)
    }
}

/// One parameter line of a substructure record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    pub kind: InteractionKind,
    /// Local atom indices, in the order the interaction is written.
    pub indices: Vec<usize>,
    /// Literal type constraints, one per index, or empty when the line carries
    /// none. `TypePattern::Any` marks a position without a constraint.
    pub literals: Vec<TypePattern>,
    pub coefficients: Coefficients,
    /// A second local-index assignment for the same physical interaction.
    pub alternate: Option<Vec<usize>>,
    /// Source line of the entry.
    pub line: usize,
}

impl ParameterEntry {
    /// Number of literal constraints that are not the wildcard.
    pub fn specificity(&self) -> usize {
        self.literals.iter().filter(|l| !l.is_wildcard()).count()
    }

    /// Checks the literal constraints against the concrete atom types found
    /// at the entry's positions.
    pub fn literals_match(&self, registry: &AtomTypeRegistry, concrete: &[&str]) -> bool {
        self.literals.is_empty()
            || (self.literals.len() == concrete.len()
                && self
                    .literals
                    .iter()
                    .zip(concrete)
                    .all(|(literal, ty)| registry.matches(literal, ty)))
    }
}
