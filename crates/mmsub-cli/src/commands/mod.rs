pub mod check;
pub mod resolve;

use crate::error::{CliError, Result};
use mmsub::core::types::registry::AtomTypeRegistry;
use std::path::Path;
use tracing::info;

/// Loads the registry at `path`, or the built-in one when no path is given.
fn load_registry(path: Option<&Path>) -> Result<AtomTypeRegistry> {
    match path {
        Some(path) => {
            info!("Loading atom-type registry from {:?}", path);
            AtomTypeRegistry::load(path).map_err(|e| CliError::FileParsing {
                path: path.to_path_buf(),
                source: e.into(),
            })
        }
        None => {
            info!("Using the built-in atom-type registry.");
            Ok(AtomTypeRegistry::builtin())
        }
    }
}
