//! mica_options: `mica.json` parsing and compiler options.
//!
//! Every field is optional in the file. Command-line flags are applied on
//! top of whatever the file provides.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "mica.json";

/// Options controlling compilation and evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Print the lowered program before running it.
    pub emit_tree: bool,
    /// Abort evaluation after this many executed statements.
    pub step_limit: Option<u64>,
    /// Abort evaluation when user functions nest deeper than this.
    pub max_call_depth: Option<usize>,
    /// Seed for the `random` builtin.
    pub random_seed: Option<u64>,
    /// Default `tracing` filter directive, e.g. `"mica_binder=debug"`.
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse options from JSON text.
pub fn parse_config(content: &str) -> Result<CompilerOptions, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parse options from a file on disk.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<CompilerOptions, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Load `mica.json` from `dir` if it exists, otherwise the defaults.
pub fn discover_config(dir: impl AsRef<Path>) -> Result<CompilerOptions, ConfigError> {
    let path = dir.as_ref().join(CONFIG_FILE_NAME);
    if path.is_file() {
        load_config_file(path)
    } else {
        Ok(CompilerOptions::default())
    }
}
