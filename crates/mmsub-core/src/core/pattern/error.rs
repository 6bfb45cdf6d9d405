use thiserror::Error;

/// Errors produced while parsing a substructure pattern.
///
/// Positions are character offsets into the pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    #[error("Pattern is empty")]
    Empty,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("Bond-order set opened at position {pos} is never closed")]
    UnclosedOrderSet { pos: usize },
    #[error("Empty bond-order set at position {pos}")]
    EmptyOrderSet { pos: usize },
    #[error("Back-reference at position {pos} has no index")]
    MissingBackReferenceIndex { pos: usize },
    #[error(
        "Atom at position {pos} would receive local index {index}, exceeding the declared count {declared}"
    )]
    IndexExceedsDeclared {
        pos: usize,
        index: usize,
        declared: usize,
    },
    #[error("Branch opened at position {pos} is never closed")]
    UnclosedBranch { pos: usize },
    #[error("Unbalanced ')' at position {pos}")]
    UnbalancedClose { pos: usize },
    #[error("Unknown atom-type symbol '{symbol}' at position {pos}")]
    UnknownAtomType { pos: usize, symbol: String },
    #[error("Back-reference at position {pos} targets undeclared local index {index}")]
    UndeclaredBackReference { pos: usize, index: usize },
    #[error("Back-reference at position {pos} points at the current atom {index}")]
    SelfReference { pos: usize, index: usize },
    #[error("Relation between local atoms {first} and {second} is declared twice (position {pos})")]
    DuplicateRelation {
        pos: usize,
        first: usize,
        second: usize,
    },
    #[error("Atom at position {pos} is not joined to the pattern by a bond operator")]
    MissingBond { pos: usize },
    #[error("Bond operator at position {pos} has no preceding atom")]
    LeadingBond { pos: usize },
    #[error("Two bond operators in a row at position {pos}")]
    ConsecutiveBonds { pos: usize },
    #[error("Bond operator at position {pos} is not followed by an atom or back-reference")]
    DanglingBond { pos: usize },
    #[error("Pattern declares {declared} atoms but introduces {found}")]
    AtomCountMismatch { declared: usize, found: usize },
}
