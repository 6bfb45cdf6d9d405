use super::defaults::DefaultParameters;
use super::error::{LibraryLoadError, LoadError, LoadErrorKind};
use super::format::read_library_text;
use super::record::SubstructureRecord;
use crate::core::types::registry::AtomTypeRegistry;
use std::path::Path;
use tracing::info;

/// An ordered, immutable collection of substructure records.
///
/// The library owns the atom-type registry its patterns were parsed against
/// (including any nonbonded records merged from the library text) and the
/// default parameter table used where no substructure applies. Once built it
/// is only read, so it can be shared across threads by reference.
#[derive(Debug, Clone, Default)]
pub struct Library {
    registry: AtomTypeRegistry,
    records: Vec<SubstructureRecord>,
    defaults: DefaultParameters,
}

/// The result of reading a library text: the usable records plus every
/// problem encountered along the way.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub library: Library,
    pub errors: Vec<LoadError>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Library {
    /// Parses a library text against `registry`.
    ///
    /// Records that fail to parse are skipped and reported in
    /// [`LoadOutcome::errors`]; the remaining records keep their relative
    /// order.
    pub fn from_str(text: &str, registry: AtomTypeRegistry) -> LoadOutcome {
        let parsed = read_library_text(text, &registry);
        let mut registry = registry;
        let mut errors = parsed.errors;

        for (line, record) in parsed.nonbonded {
            if let Err(e) = registry.merge_nonbonded(record) {
                errors.push(LoadError {
                    line,
                    record: None,
                    kind: LoadErrorKind::UnknownAtomType(e),
                });
            }
        }
        errors.sort_by_key(|e| e.line);

        info!(
            records = parsed.records.len(),
            errors = errors.len(),
            "Substructure library parsed"
        );

        LoadOutcome {
            library: Self {
                registry,
                records: parsed.records,
                defaults: DefaultParameters::default(),
            },
            errors,
        }
    }

    /// Reads and parses a library file.
    ///
    /// # Errors
    ///
    /// Only failure to read the file is fatal; content problems are collected
    /// in the returned [`LoadOutcome`].
    pub fn load(path: &Path, registry: AtomTypeRegistry) -> Result<LoadOutcome, LibraryLoadError> {
        let text = std::fs::read_to_string(path).map_err(|e| LibraryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Ok(Self::from_str(&text, registry))
    }

    /// Attaches the default parameter table.
    pub fn with_defaults(mut self, defaults: DefaultParameters) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn registry(&self) -> &AtomTypeRegistry {
        &self.registry
    }

    pub fn records(&self) -> &[SubstructureRecord] {
        &self.records
    }

    pub fn record(&self, order: usize) -> Option<&SubstructureRecord> {
        self.records.get(order)
    }

    pub fn defaults(&self) -> &DefaultParameters {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
