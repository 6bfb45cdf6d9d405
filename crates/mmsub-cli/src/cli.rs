use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "mmsub - Substructure pattern matching and bonded-parameter resolution for molecular-mechanics force fields.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to resolve molecules in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a substructure library and report every malformed record.
    Check(CheckArgs),
    /// Resolve the bonded parameters of one or more molecules.
    Resolve(ResolveArgs),
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the substructure library file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub library: PathBuf,

    /// Path to an atom-type registry in TOML format.
    /// The built-in registry is used when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

/// Arguments for the `resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Input molecule files in BGF format.
    #[arg(short, long = "molecule", required = true, num_args = 1.., value_name = "PATH")]
    pub molecules: Vec<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the substructure library file, overriding the config file.
    #[arg(short, long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Path to an atom-type registry, overriding the config file.
    #[arg(short, long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Path to a CSV table of library default parameters, overriding the config file.
    #[arg(short, long, value_name = "PATH")]
    pub defaults: Option<PathBuf>,

    /// Override the maximum number of matches enumerated per record.
    #[arg(long, value_name = "INT")]
    pub max_mappings: Option<usize>,

    /// Fail a molecule when any interaction is left without parameters.
    #[arg(long)]
    pub strict: bool,

    /// Write the TOML report to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolve_with_multiple_molecules() {
        let cli = Cli::parse_from([
            "mmsub", "-j", "2", "resolve", "-l", "rh.sub", "-m", "a.bgf", "b.bgf", "--strict",
        ]);
        assert_eq!(cli.threads, Some(2));
        let Commands::Resolve(args) = cli.command else {
            panic!("Expected 'resolve' subcommand");
        };
        assert_eq!(args.library, Some(PathBuf::from("rh.sub")));
        assert_eq!(args.molecules.len(), 2);
        assert!(args.strict);
        assert!(args.output.is_none());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["mmsub", "check", "-l", "rh.sub", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn resolve_requires_a_molecule() {
        assert!(Cli::try_parse_from(["mmsub", "resolve", "-l", "rh.sub"]).is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["mmsub", "-q", "-v", "check", "-l", "rh.sub"]).is_err());
    }
}
