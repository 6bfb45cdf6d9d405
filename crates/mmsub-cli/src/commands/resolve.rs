use super::load_registry;
use crate::cli::ResolveArgs;
use crate::config::{AppConfig, PartialResolveConfig};
use crate::error::{CliError, Result};
use crate::report::{MoleculeReport, Report};
use crate::utils::progress::CliProgressHandler;
use mmsub::{
    core::io::{bgf::BgfFile, traits::MoleculeFile},
    core::library::defaults::DefaultParameters,
    core::models::molecule::MoleculeGraph,
    engine::progress::ProgressReporter,
    workflows,
};
use tracing::{info, warn};

pub fn run(args: ResolveArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialResolveConfig::from_file(path)?,
        None => PartialResolveConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;
    run_with_handler(&args, config, CliProgressHandler::new())
}

fn run_with_handler(
    args: &ResolveArgs,
    config: AppConfig,
    progress_handler: CliProgressHandler,
) -> Result<()> {
    let registry = load_registry(config.registry_path.as_deref())?;

    let outcome = workflows::resolve::load_library(&config.library_path, registry).map_err(
        |e| CliError::FileParsing {
            path: config.library_path.clone(),
            source: e.into(),
        },
    )?;
    if !outcome.is_clean() {
        warn!(
            "{} malformed record(s) in {:?} were skipped.",
            outcome.errors.len(),
            &config.library_path
        );
    }
    let mut library = outcome.library;

    if let Some(path) = &config.defaults_path {
        info!("Loading library defaults from {:?}", path);
        let defaults = DefaultParameters::load(path, library.registry()).map_err(|e| {
            CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            }
        })?;
        library = library.with_defaults(defaults);
    }

    let molecules = args
        .molecules
        .iter()
        .map(|path| {
            info!("Loading molecule from {:?}", path);
            BgfFile::read_from_path(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })
        })
        .collect::<Result<Vec<MoleculeGraph>>>()?;

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let results =
        workflows::resolve::resolve_many(&library, &molecules, &config.resolver, &reporter);

    let report = Report {
        molecule: args
            .molecules
            .iter()
            .zip(&molecules)
            .zip(&results)
            .map(|((path, molecule), result)| MoleculeReport::new(path, molecule, result))
            .collect(),
    };
    let text = report
        .to_toml()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialize report: {}", e)))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("Report written to: {}", path.display());
        }
        None => print!("{}", text),
    }

    let failed = report.failed_count();
    if failed > 0 {
        return Err(CliError::Resolution {
            failed,
            total: molecules.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmsub::engine::config::{ResolverConfig, UnassignedPolicy};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    const BUNDLED: &str = include_str!("../../../mmsub-core/data/rh-hydrogenation.sub");

    fn atom_line(serial: usize, name: &str, ff_type: &str) -> String {
        format!(
            "{:<6} {:>5} {:<5} {:>3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5}{:>3}{:>2} {:>8.5}",
            "HETATM", serial, name, "RES", "A", 1, 0.0, 0.0, 0.0, ff_type, 1, 0, 0.0
        )
    }

    fn write_rh_phosphine(dir: &Path, with_hydride: bool) -> PathBuf {
        let mut lines = vec![
            "BIOGRF 200".to_string(),
            atom_line(1, "RH1", "Rh"),
            atom_line(2, "P1", "P1"),
        ];
        if with_hydride {
            lines.push(atom_line(3, "HA", "H1"));
            lines.push("CONECT     1     2     3".to_string());
        } else {
            lines.push("CONECT     1     2".to_string());
        }
        lines.push("END".to_string());

        let path = dir.join(if with_hydride { "rhph.bgf" } else { "rhp.bgf" });
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn setup(dir: &Path, with_hydride: bool, policy: UnassignedPolicy) -> (ResolveArgs, AppConfig) {
        let library_path = dir.join("rh.sub");
        fs::write(&library_path, BUNDLED).unwrap();
        let args = ResolveArgs {
            molecules: vec![write_rh_phosphine(dir, with_hydride)],
            config: None,
            library: Some(library_path.clone()),
            registry: None,
            defaults: None,
            max_mappings: None,
            strict: false,
            output: Some(dir.join("report.toml")),
        };
        let config = AppConfig {
            library_path,
            registry_path: None,
            defaults_path: None,
            resolver: ResolverConfig {
                max_mappings_per_record: None,
                unassigned_policy: policy,
            },
        };
        (args, config)
    }

    #[test]
    fn writes_report_for_resolved_molecule() {
        let dir = tempdir().unwrap();
        let (args, config) = setup(dir.path(), false, UnassignedPolicy::Report);

        run_with_handler(&args, config, CliProgressHandler::hidden()).unwrap();

        let text = fs::read_to_string(dir.path().join("report.toml")).unwrap();
        assert!(text.contains("status = \"complete\""));
        assert!(text.contains("RH-PX"));
    }

    #[test]
    fn strict_policy_fails_the_command_but_still_writes_the_report() {
        let dir = tempdir().unwrap();
        let (args, config) = setup(dir.path(), true, UnassignedPolicy::Fail);

        let result = run_with_handler(&args, config, CliProgressHandler::hidden());
        assert!(matches!(
            result,
            Err(CliError::Resolution {
                failed: 1,
                total: 1
            })
        ));
        let text = fs::read_to_string(dir.path().join("report.toml")).unwrap();
        assert!(text.contains("status = \"failed\""));
    }

    #[test]
    fn defaults_fill_interactions_without_substructure_entries() {
        let dir = tempdir().unwrap();
        let (args, mut config) = setup(dir.path(), true, UnassignedPolicy::Fail);
        let defaults_path = dir.path().join("defaults.csv");
        fs::write(
            &defaults_path,
            "kind,type1,type2,type3,type4,c1,c2,c3\n\
             bond,Rh,HX,,,1.5800,2.0000,\n\
             angle,PX,Rh,HX,,90.0000,0.8000,\n",
        )
        .unwrap();
        config.defaults_path = Some(defaults_path);

        run_with_handler(&args, config, CliProgressHandler::hidden()).unwrap();

        let text = fs::read_to_string(dir.path().join("report.toml")).unwrap();
        assert!(text.contains("status = \"complete\""));
        assert!(text.contains("default row 1"));
    }

    #[test]
    fn unreadable_molecule_aborts_before_resolution() {
        let dir = tempdir().unwrap();
        let (mut args, config) = setup(dir.path(), false, UnassignedPolicy::Report);
        args.molecules.push(dir.path().join("absent.bgf"));

        let result = run_with_handler(&args, config, CliProgressHandler::hidden());
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
        assert!(!dir.path().join("report.toml").exists());
    }
}
