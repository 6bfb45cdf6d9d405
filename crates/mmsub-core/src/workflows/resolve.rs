use crate::core::library::error::LibraryLoadError;
use crate::core::library::substructures::{Library, LoadOutcome};
use crate::core::models::molecule::MoleculeGraph;
use crate::core::types::registry::AtomTypeRegistry;
use crate::engine::config::ResolverConfig;
use crate::engine::error::ResolutionError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::resolved::ResolvedParameterSet;
use crate::engine::resolver::Resolver;
use std::path::Path;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Loads a substructure library file.
///
/// Reading the file is fail-fast; problems inside the file are collected per
/// record in the returned [`LoadOutcome`] and the records that parsed remain
/// usable.
#[instrument(skip_all, name = "load_library", fields(path = %path.display()))]
pub fn load_library(
    path: &Path,
    registry: AtomTypeRegistry,
) -> Result<LoadOutcome, LibraryLoadError> {
    let outcome = Library::load(path, registry)?;
    for error in &outcome.errors {
        warn!("{}", error);
    }
    info!(
        "Loaded {} substructure record(s) with {} error(s).",
        outcome.library.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

/// Resolves the bonded parameters of one molecule.
#[instrument(skip_all, name = "resolve_workflow", fields(atoms = molecule.atom_count()))]
pub fn resolve(
    library: &Library,
    molecule: &MoleculeGraph,
    config: &ResolverConfig,
) -> Result<ResolvedParameterSet, ResolutionError> {
    Resolver::new(library, config).resolve(molecule)
}

/// Resolves many independent molecules against one shared library.
///
/// Results are returned in input order. With the `parallel` feature the
/// molecules are processed concurrently.
#[instrument(skip_all, name = "resolve_many_workflow", fields(molecules = molecules.len()))]
pub fn resolve_many(
    library: &Library,
    molecules: &[MoleculeGraph],
    config: &ResolverConfig,
    reporter: &ProgressReporter,
) -> Vec<Result<ResolvedParameterSet, ResolutionError>> {
    reporter.report(Progress::TaskStart {
        total_steps: molecules.len() as u64,
    });

    let resolver = Resolver::new(library, config);

    #[cfg(not(feature = "parallel"))]
    let iterator = molecules.iter();

    #[cfg(feature = "parallel")]
    let iterator = molecules.par_iter();

    let results: Vec<_> = iterator
        .enumerate()
        .map(|(index, molecule)| {
            let result = resolver.resolve(molecule);
            if let Err(e) = &result {
                reporter.report(Progress::Message(format!("Molecule {}: {}", index + 1, e)));
            }
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        "Resolved {} molecule(s), {} failed.",
        results.len() - failed,
        failed
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondOrder;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    const LIBRARY: &str = "\
C  ethane
 2  C3-C3
-2
 1  1  2  1.5300  4.4000
-3
C  broken
 2  C3-Zz
-2
-3
";

    fn ethane() -> MoleculeGraph {
        let mut mol = MoleculeGraph::new();
        let a = mol.add_atom("C1", "C3");
        let b = mol.add_atom("C2", "C3");
        mol.add_bond(a, b, BondOrder::Single).unwrap();
        mol
    }

    #[test]
    fn load_library_keeps_good_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lib.sub");
        fs::write(&path, LIBRARY).unwrap();

        let outcome = load_library(&path, AtomTypeRegistry::builtin()).unwrap();
        assert_eq!(outcome.library.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
    }

    #[test]
    fn load_library_fails_fast_on_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_library(&dir.path().join("missing.sub"), AtomTypeRegistry::builtin());
        assert!(result.is_err());
    }

    #[test]
    fn resolve_many_keeps_input_order_and_reports_progress() {
        let library = Library::from_str(LIBRARY, AtomTypeRegistry::builtin()).library;
        let molecules = vec![ethane(), MoleculeGraph::new(), ethane()];
        let increments = AtomicU64::new(0);
        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::TaskIncrement => {
                increments.fetch_add(1, Ordering::SeqCst);
            }
            Progress::Message(msg) => messages.lock().unwrap().push(msg),
            _ => {}
        }));

        let results = resolve_many(&library, &molecules, &ResolverConfig::default(), &reporter);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ResolutionError::EmptyMolecule)));
        assert_eq!(results[0].as_ref().unwrap(), results[2].as_ref().unwrap());
        drop(reporter);
        assert_eq!(increments.load(Ordering::SeqCst), 3);
        assert_eq!(
            messages.into_inner().unwrap(),
            vec!["Molecule 2: Molecule has no atoms"]
        );
    }

    #[test]
    fn resolve_single_molecule() {
        let library = Library::from_str(LIBRARY, AtomTypeRegistry::builtin()).library;
        let set = resolve(&library, &ethane(), &ResolverConfig::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.is_complete());
    }
}
