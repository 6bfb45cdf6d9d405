use super::entry::Coefficients;
use crate::core::models::interaction::InteractionKind;
use crate::core::types::registry::{AtomTypeRegistry, TypePattern, UnknownAtomTypeError};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// One row of the library default table: a type tuple and its coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultRow {
    pub kind: InteractionKind,
    pub types: Vec<TypePattern>,
    pub coefficients: Coefficients,
}

impl DefaultRow {
    fn specificity(&self) -> usize {
        self.types.iter().filter(|t| !t.is_wildcard()).count()
    }

    /// True if the row's type tuple matches the concrete types, read forward
    /// or reversed.
    pub fn matches(&self, registry: &AtomTypeRegistry, concrete: &[&str]) -> bool {
        if self.types.len() != concrete.len() {
            return false;
        }
        let forward = self
            .types
            .iter()
            .zip(concrete)
            .all(|(t, c)| registry.matches(t, c));
        forward
            || self
                .types
                .iter()
                .zip(concrete.iter().rev())
                .all(|(t, c)| registry.matches(t, c))
    }
}

/// Generic bonded parameters keyed by atom-type tuple.
///
/// These are the parameters a molecule receives where no substructure
/// applies. Rows are kept in load order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultParameters {
    rows: Vec<DefaultRow>,
}

#[derive(Debug, Error)]
pub enum DefaultsLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Row {row}: {source}")]
    UnknownAtomType {
        row: usize,
        source: UnknownAtomTypeError,
    },
    #[error("Row {row}: {kind} rows need {expected} atom types, found {found}")]
    TypeCount {
        row: usize,
        kind: InteractionKind,
        expected: usize,
        found: usize,
    },
    #[error("Row {row}: {kind} rows need {expected} coefficients, found {found}")]
    CoefficientCount {
        row: usize,
        kind: InteractionKind,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Deserialize)]
struct RawDefaultRow {
    kind: InteractionKind,
    type1: String,
    type2: String,
    type3: Option<String>,
    type4: Option<String>,
    c1: f64,
    c2: f64,
    c3: Option<f64>,
}

impl DefaultParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a CSV table with the header
    /// `kind,type1,type2,type3,type4,c1,c2,c3`.
    pub fn load(path: &Path, registry: &AtomTypeRegistry) -> Result<Self, DefaultsLoadError> {
        let file = std::fs::File::open(path).map_err(|e| DefaultsLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_reader(file, &path.to_string_lossy(), registry)
    }

    pub fn from_reader(
        reader: impl Read,
        origin: &str,
        registry: &AtomTypeRegistry,
    ) -> Result<Self, DefaultsLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut table = Self::new();
        for (index, result) in reader.deserialize::<RawDefaultRow>().enumerate() {
            let raw = result.map_err(|e| DefaultsLoadError::Csv {
                path: origin.to_string(),
                source: e,
            })?;
            table.rows.push(Self::convert(raw, index + 1, registry)?);
        }
        Ok(table)
    }

    fn convert(
        raw: RawDefaultRow,
        row: usize,
        registry: &AtomTypeRegistry,
    ) -> Result<DefaultRow, DefaultsLoadError> {
        let kind = raw.kind;
        let symbols: Vec<String> = [Some(raw.type1), Some(raw.type2), raw.type3, raw.type4]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if symbols.len() != kind.arity() {
            return Err(DefaultsLoadError::TypeCount {
                row,
                kind,
                expected: kind.arity(),
                found: symbols.len(),
            });
        }
        let types = symbols
            .iter()
            .map(|s| registry.resolve(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| DefaultsLoadError::UnknownAtomType { row, source })?;

        let values: Vec<f64> = [Some(raw.c1), Some(raw.c2), raw.c3]
            .into_iter()
            .flatten()
            .collect();
        let coefficients = Coefficients::from_values(kind, &values).ok_or(
            DefaultsLoadError::CoefficientCount {
                row,
                kind,
                expected: kind.coefficient_count(),
                found: values.len(),
            },
        )?;
        Ok(DefaultRow {
            kind,
            types,
            coefficients,
        })
    }

    pub fn push(&mut self, row: DefaultRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[DefaultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the row that applies to an interaction of the given class over
    /// the given concrete types.
    ///
    /// The row with the most non-wildcard types wins; among equally specific
    /// rows the later one does. Returns the row's index with the row.
    pub fn lookup(
        &self,
        registry: &AtomTypeRegistry,
        kind: InteractionKind,
        concrete: &[&str],
    ) -> Option<(usize, &DefaultRow)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.kind == kind && row.matches(registry, concrete))
            .max_by_key(|(index, row)| (row.specificity(), *index))
    }
}
