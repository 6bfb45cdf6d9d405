use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};
use mmsub::engine::config::{self as core_config, UnassignedPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialResolverConfig {
    #[serde(rename = "max-mappings-per-record")]
    max_mappings_per_record: Option<usize>,
    #[serde(rename = "unassigned-policy")]
    unassigned_policy: Option<UnassignedPolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialInputConfig {
    library: Option<PathBuf>,
    registry: Option<PathBuf>,
    defaults: Option<PathBuf>,
}

/// The `resolve` configuration as read from a TOML file. Every field is
/// optional; command-line arguments take precedence.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialResolveConfig {
    input: Option<PartialInputConfig>,
    resolver: Option<PartialResolverConfig>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Fully merged settings for one `resolve` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub library_path: PathBuf,
    pub registry_path: Option<PathBuf>,
    pub defaults_path: Option<PathBuf>,
    pub resolver: core_config::ResolverConfig,
}

impl PartialResolveConfig {
    /// Reads a config file. Relative paths inside it are taken relative to
    /// the file's own directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn merge_with_cli(self, args: &ResolveArgs) -> Result<AppConfig> {
        let input = self.input.unwrap_or_default();
        let resolver = self.resolver.unwrap_or_default();
        let base_dir = self.base_dir;
        let from_file = |path: Option<PathBuf>| -> Option<PathBuf> {
            path.map(|p| match &base_dir {
                Some(dir) if p.is_relative() => dir.join(p),
                _ => p,
            })
        };

        let library_path = args
            .library
            .clone()
            .or_else(|| from_file(input.library))
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'library' is required either in the config file or via CLI argument."
                        .to_string(),
                )
            })?;
        let registry_path = args.registry.clone().or_else(|| from_file(input.registry));
        let defaults_path = args.defaults.clone().or_else(|| from_file(input.defaults));

        let mut builder = core_config::ResolverConfigBuilder::new();
        if let Some(limit) = args.max_mappings.or(resolver.max_mappings_per_record) {
            builder = builder.max_mappings_per_record(limit);
        }
        let policy = if args.strict {
            UnassignedPolicy::Fail
        } else {
            resolver.unassigned_policy.unwrap_or_default()
        };
        builder = builder.unassigned_policy(policy);

        let resolver = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            library_path,
            registry_path,
            defaults_path,
            resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn resolve_args(extra: &[&str]) -> ResolveArgs {
        let mut argv = vec!["mmsub", "resolve", "-m", "mol.bgf"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Resolve(args) => args,
            _ => panic!("Expected 'resolve' subcommand"),
        }
    }

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("mmsub.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn file_values_are_used_and_paths_anchor_to_the_file() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [input]
            library = "rh.sub"
            defaults = "/opt/ff/defaults.csv"

            [resolver]
            max-mappings-per-record = 64
            unassigned-policy = "fail"
            "#,
        );

        let config = PartialResolveConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&resolve_args(&[]))
            .unwrap();

        assert_eq!(config.library_path, dir.path().join("rh.sub"));
        assert_eq!(
            config.defaults_path,
            Some(PathBuf::from("/opt/ff/defaults.csv"))
        );
        assert!(config.registry_path.is_none());
        assert_eq!(config.resolver.max_mappings_per_record, Some(64));
        assert_eq!(config.resolver.unassigned_policy, UnassignedPolicy::Fail);
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [input]
            library = "rh.sub"

            [resolver]
            max-mappings-per-record = 64
            "#,
        );

        let args = resolve_args(&["-l", "other.sub", "--max-mappings", "8", "--strict"]);
        let config = PartialResolveConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.library_path, PathBuf::from("other.sub"));
        assert_eq!(config.resolver.max_mappings_per_record, Some(8));
        assert_eq!(config.resolver.unassigned_policy, UnassignedPolicy::Fail);
    }

    #[test]
    fn missing_library_is_a_config_error() {
        let result = PartialResolveConfig::default().merge_with_cli(&resolve_args(&[]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn zero_mapping_limit_is_rejected() {
        let result = PartialResolveConfig::default()
            .merge_with_cli(&resolve_args(&["-l", "rh.sub", "--max-mappings", "0"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[resolver]\nmax-matches = 3\n");
        assert!(matches!(
            PartialResolveConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
