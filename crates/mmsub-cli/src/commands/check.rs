use super::load_registry;
use crate::cli::CheckArgs;
use crate::error::{CliError, Result};
use mmsub::workflows::resolve::load_library;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let registry = load_registry(args.registry.as_deref())?;

    info!("Loading substructure library from {:?}", &args.library);
    let outcome = load_library(&args.library, registry).map_err(|e| CliError::FileParsing {
        path: args.library.clone(),
        source: e.into(),
    })?;

    for record in outcome.library.records() {
        println!(
            "  {:<3} {:<48} {:>2} atom(s) {:>3} entr{}",
            record.order,
            record.label,
            record.atom_count,
            record.entries.len(),
            if record.entries.len() == 1 { "y" } else { "ies" }
        );
    }
    for error in &outcome.errors {
        println!("✗ {}", error);
    }
    println!(
        "{} record(s) loaded, {} error(s).",
        outcome.library.len(),
        outcome.errors.len()
    );

    if outcome.is_clean() {
        Ok(())
    } else {
        Err(CliError::InvalidLibrary {
            path: args.library,
            count: outcome.errors.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BUNDLED: &str = include_str!("../../../mmsub-core/data/rh-hydrogenation.sub");

    #[test]
    fn bundled_library_checks_clean() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rh.sub");
        fs::write(&path, BUNDLED).unwrap();

        let args = CheckArgs {
            library: path,
            registry: None,
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn malformed_records_fail_the_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.sub");
        fs::write(&path, "C  broken\n 2  Rh-Qq\n-2\n-3\n").unwrap();

        let args = CheckArgs {
            library: path,
            registry: None,
        };
        assert!(matches!(
            run(args),
            Err(CliError::InvalidLibrary { count: 1, .. })
        ));
    }

    #[test]
    fn missing_library_is_a_parse_failure() {
        let dir = tempdir().unwrap();
        let args = CheckArgs {
            library: dir.path().join("absent.sub"),
            registry: None,
        };
        assert!(matches!(run(args), Err(CliError::FileParsing { .. })));
    }
}
