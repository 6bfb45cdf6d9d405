use super::builtin::{BUILTIN_ATOM_TYPES, BUILTIN_CLASSES, WILDCARD_SYMBOL};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// What a pattern position (or a literal constraint) requires of a concrete
/// atom type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypePattern {
    /// The universal wildcard `00`; matches any concrete type.
    Any,
    /// Exactly one concrete atom type.
    Exact(String),
    /// Any member of a named equivalence class.
    Class(String),
}

impl TypePattern {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Any => WILDCARD_SYMBOL,
            Self::Exact(s) | Self::Class(s) => s,
        }
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown atom type symbol '{symbol}'")]
pub struct UnknownAtomTypeError {
    pub symbol: String,
}

#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    UnknownAtomType(#[from] UnknownAtomTypeError),
    #[error("Symbol '{0}' is already registered as a type or class")]
    DuplicateSymbol(String),
    #[error("Invalid atom type symbol '{0}'")]
    InvalidSymbol(String),
}

/// Opaque nonbonded (van der Waals) record, keyed by atom-type symbol.
///
/// The fields are carried through untouched; neither the matcher nor the
/// resolver interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonbondedRecord {
    pub symbol: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRegistryFile {
    #[serde(default)]
    types: BTreeMap<String, String>,
    #[serde(default)]
    classes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct AtomTypeRegistry {
    types: BTreeMap<String, String>,
    classes: BTreeMap<String, BTreeSet<String>>,
    nonbonded: BTreeMap<String, NonbondedRecord>,
}

fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol != WILDCARD_SYMBOL
        && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl AtomTypeRegistry {
    /// An empty registry that only knows the wildcard.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The registry of built-in atom types and equivalence classes.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (symbol, description) in BUILTIN_ATOM_TYPES.entries() {
            registry
                .types
                .insert(symbol.to_string(), description.to_string());
        }
        for (name, members) in BUILTIN_CLASSES.entries() {
            registry.classes.insert(
                name.to_string(),
                members.split_whitespace().map(str::to_string).collect(),
            );
        }
        registry
    }

    /// Loads a registry file on top of the built-in registry.
    ///
    /// The file is TOML with an optional `[types]` table (symbol to
    /// description) and an optional `[classes]` table (class name to member
    /// list).
    pub fn load(path: &Path) -> Result<Self, RegistryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::builtin().extend_from_toml(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RegistryLoadError> {
        Self::builtin().extend_from_toml(content, "<inline>")
    }

    fn extend_from_toml(mut self, content: &str, origin: &str) -> Result<Self, RegistryLoadError> {
        let raw: RawRegistryFile =
            toml::from_str(content).map_err(|e| RegistryLoadError::Toml {
                path: origin.to_string(),
                source: e,
            })?;
        for (symbol, description) in raw.types {
            self.register_type(&symbol, &description)?;
        }
        for (name, members) in raw.classes {
            self.register_class(&name, members.iter().map(String::as_str))?;
        }
        Ok(self)
    }

    pub fn register_type(&mut self, symbol: &str, description: &str) -> Result<(), RegistryLoadError> {
        if !is_valid_symbol(symbol) {
            return Err(RegistryLoadError::InvalidSymbol(symbol.to_string()));
        }
        if self.types.contains_key(symbol) || self.classes.contains_key(symbol) {
            return Err(RegistryLoadError::DuplicateSymbol(symbol.to_string()));
        }
        self.types.insert(symbol.to_string(), description.to_string());
        Ok(())
    }

    /// Registers a named equivalence class. Every member must already be a
    /// registered concrete type.
    pub fn register_class<'m>(
        &mut self,
        name: &str,
        members: impl IntoIterator<Item = &'m str>,
    ) -> Result<(), RegistryLoadError> {
        if !is_valid_symbol(name) {
            return Err(RegistryLoadError::InvalidSymbol(name.to_string()));
        }
        if self.types.contains_key(name) || self.classes.contains_key(name) {
            return Err(RegistryLoadError::DuplicateSymbol(name.to_string()));
        }
        let mut set = BTreeSet::new();
        for member in members {
            if !self.types.contains_key(member) {
                return Err(UnknownAtomTypeError {
                    symbol: member.to_string(),
                }
                .into());
            }
            set.insert(member.to_string());
        }
        self.classes.insert(name.to_string(), set);
        Ok(())
    }

    /// Resolves a symbol to the wildcard, a concrete type or a class.
    pub fn resolve(&self, symbol: &str) -> Result<TypePattern, UnknownAtomTypeError> {
        if symbol == WILDCARD_SYMBOL {
            Ok(TypePattern::Any)
        } else if self.types.contains_key(symbol) {
            Ok(TypePattern::Exact(symbol.to_string()))
        } else if self.classes.contains_key(symbol) {
            Ok(TypePattern::Class(symbol.to_string()))
        } else {
            Err(UnknownAtomTypeError {
                symbol: symbol.to_string(),
            })
        }
    }

    /// True if `concrete` equals the pattern type, the pattern is the
    /// wildcard, or `concrete` is a member of the pattern's class.
    pub fn matches(&self, pattern: &TypePattern, concrete: &str) -> bool {
        match pattern {
            TypePattern::Any => true,
            TypePattern::Exact(symbol) => symbol == concrete,
            TypePattern::Class(name) => self
                .classes
                .get(name)
                .is_some_and(|members| members.contains(concrete)),
        }
    }

    pub fn contains_type(&self, symbol: &str) -> bool {
        self.types.contains_key(symbol)
    }

    pub fn describe(&self, symbol: &str) -> Option<&str> {
        self.types.get(symbol).map(String::as_str)
    }

    pub fn class_members(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.classes.get(name)
    }

    /// Merges an opaque nonbonded record into the registry metadata. A later
    /// record for the same symbol replaces an earlier one.
    pub fn merge_nonbonded(&mut self, record: NonbondedRecord) -> Result<(), UnknownAtomTypeError> {
        if !self.types.contains_key(&record.symbol) {
            return Err(UnknownAtomTypeError {
                symbol: record.symbol,
            });
        }
        self.nonbonded.insert(record.symbol.clone(), record);
        Ok(())
    }

    pub fn nonbonded(&self, symbol: &str) -> Option<&NonbondedRecord> {
        self.nonbonded.get(symbol)
    }

    pub fn nonbonded_iter(&self) -> impl Iterator<Item = &NonbondedRecord> {
        self.nonbonded.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builtin_resolves_types_classes_and_wildcard() {
        let registry = AtomTypeRegistry::builtin();
        assert_eq!(registry.resolve("00").unwrap(), TypePattern::Any);
        assert_eq!(
            registry.resolve("Rh").unwrap(),
            TypePattern::Exact("Rh".to_string())
        );
        assert_eq!(
            registry.resolve("HX").unwrap(),
            TypePattern::Class("HX".to_string())
        );
    }

    #[test]
    fn resolve_rejects_unregistered_symbol() {
        let registry = AtomTypeRegistry::builtin();
        assert_eq!(
            registry.resolve("Zz"),
            Err(UnknownAtomTypeError {
                symbol: "Zz".to_string()
            })
        );
    }

    #[test]
    fn hydrogen_class_lists_seven_subtypes() {
        let registry = AtomTypeRegistry::builtin();
        let members = registry.class_members("HX").unwrap();
        assert_eq!(members.len(), 7);
        let hx = registry.resolve("HX").unwrap();
        for member in members {
            assert!(registry.matches(&hx, member));
        }
        assert!(!registry.matches(&hx, "C3"));
    }

    #[test]
    fn matches_follows_exact_wildcard_and_class_rules() {
        let registry = AtomTypeRegistry::builtin();
        let exact = registry.resolve("C2").unwrap();
        assert!(registry.matches(&exact, "C2"));
        assert!(!registry.matches(&exact, "C3"));
        assert!(registry.matches(&TypePattern::Any, "anything"));
        let px = registry.resolve("PX").unwrap();
        assert!(registry.matches(&px, "P0"));
        assert!(!registry.matches(&px, "Rh"));
    }

    #[test]
    fn register_class_requires_known_members() {
        let mut registry = AtomTypeRegistry::builtin();
        let result = registry.register_class("MX", ["Rh", "Ru"]);
        assert!(matches!(
            result,
            Err(RegistryLoadError::UnknownAtomType(UnknownAtomTypeError { ref symbol })) if symbol == "Ru"
        ));
        assert!(registry.resolve("MX").is_err());
    }

    #[test]
    fn register_rejects_duplicates_and_invalid_symbols() {
        let mut registry = AtomTypeRegistry::builtin();
        assert!(matches!(
            registry.register_type("HX", "clash"),
            Err(RegistryLoadError::DuplicateSymbol(_))
        ));
        assert!(matches!(
            registry.register_type("00", "wildcard"),
            Err(RegistryLoadError::InvalidSymbol(_))
        ));
        assert!(matches!(
            registry.register_type("C-3", "bad"),
            Err(RegistryLoadError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn from_toml_str_extends_builtin() {
        let registry = AtomTypeRegistry::from_toml_str(
            r#"
            [types]
            Ru = "ruthenium"

            [classes]
            MX = ["Rh", "Ru"]
            "#,
        )
        .unwrap();
        assert!(registry.contains_type("Ru"));
        assert!(registry.contains_type("C3"));
        let mx = registry.resolve("MX").unwrap();
        assert!(registry.matches(&mx, "Ru"));
        assert!(registry.matches(&mx, "Rh"));
    }

    #[test]
    fn load_reads_registry_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.toml");
        fs::write(&path, "[types]\nIr = \"iridium\"\n").unwrap();
        let registry = AtomTypeRegistry::load(&path).unwrap();
        assert_eq!(registry.describe("Ir"), Some("iridium"));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = AtomTypeRegistry::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(RegistryLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_unknown_keys() {
        let result = AtomTypeRegistry::from_toml_str("[elements]\nC = 6\n");
        assert!(matches!(result, Err(RegistryLoadError::Toml { .. })));
    }

    #[test]
    fn merge_nonbonded_keeps_latest_record() {
        let mut registry = AtomTypeRegistry::builtin();
        let first = NonbondedRecord {
            symbol: "Rh".to_string(),
            fields: vec!["2.45".to_string()],
        };
        let second = NonbondedRecord {
            symbol: "Rh".to_string(),
            fields: vec!["2.50".to_string(), "0.05".to_string()],
        };
        registry.merge_nonbonded(first).unwrap();
        registry.merge_nonbonded(second.clone()).unwrap();
        assert_eq!(registry.nonbonded("Rh"), Some(&second));
        assert_eq!(registry.nonbonded_iter().count(), 1);
    }

    #[test]
    fn merge_nonbonded_rejects_unknown_symbol() {
        let mut registry = AtomTypeRegistry::builtin();
        let result = registry.merge_nonbonded(NonbondedRecord {
            symbol: "Qq".to_string(),
            fields: vec![],
        });
        assert!(result.is_err());
    }
}
