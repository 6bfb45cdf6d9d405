use crate::core::pattern::error::PatternSyntaxError;
use crate::core::types::registry::UnknownAtomTypeError;
use thiserror::Error;

/// A problem with one line of a substructure library.
///
/// Load errors are collected rather than returned early: the record they
/// belong to is dropped and loading continues with the next record.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Line {line}{}: {kind}", .record.as_deref().map(|r| format!(" (record '{r}')")).unwrap_or_default())]
pub struct LoadError {
    /// 1-based line number in the library text.
    pub line: usize,
    /// Label of the record being read, if any.
    pub record: Option<String>,
    pub kind: LoadErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadErrorKind {
    #[error("Invalid pattern: {0}")]
    PatternSyntax(PatternSyntaxError),
    #[error(transparent)]
    UnknownAtomType(#[from] UnknownAtomTypeError),
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Atom-count line has no pattern")]
    MissingPattern,
    #[error("Expected parameter section delimiter '-2', found '{0}'")]
    MissingSectionDelimiter(String),
    #[error("Record is not closed by '-3'")]
    UnterminatedRecord,
    #[error("Unknown parameter class tag '{0}'")]
    UnknownClassTag(String),
    #[error("Invalid local atom index '{0}'")]
    InvalidIndex(String),
    #[error("Local atom index {index} is outside 1..={declared}")]
    IndexOutOfRange { index: usize, declared: usize },
    #[error("Expected {expected} local atom indices, found {found}")]
    IndexCount { expected: usize, found: usize },
    #[error("Local atom index {0} appears twice in one entry")]
    RepeatedIndex(usize),
    #[error("Local atoms {0:?} do not form a bonded chain in the pattern")]
    NotAnInteraction(Vec<usize>),
    #[error("Expected {expected} coefficients, found {found}")]
    CoefficientCount { expected: usize, found: usize },
    #[error("Expected 0 or {expected} literal atom types, found {found}")]
    LiteralCount { expected: usize, found: usize },
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Alternate line does not follow an entry of the same class")]
    OrphanAlternate,
    #[error("Alternate indices {alternate:?} do not name the same atoms as {primary:?}")]
    InvalidAlternate {
        primary: Vec<usize>,
        alternate: Vec<usize>,
    },
    #[error("Nonbonded line has no atom-type symbol")]
    MissingNonbondedSymbol,
    #[error("Unexpected line '{0}'")]
    UnexpectedLine(String),
}

impl From<PatternSyntaxError> for LoadErrorKind {
    fn from(err: PatternSyntaxError) -> Self {
        match err {
            PatternSyntaxError::UnknownAtomType { symbol, .. } => {
                Self::UnknownAtomType(UnknownAtomTypeError { symbol })
            }
            other => Self::PatternSyntax(other),
        }
    }
}

/// Fatal errors that prevent a library from being read at all.
#[derive(Debug, Error)]
pub enum LibraryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
