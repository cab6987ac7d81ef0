//! Loading `.config/tapcat.styx`.
//!
//! A project keeps its resolution settings next to its catalogs. The file is
//! looked up from a starting directory towards the filesystem root and the
//! closest one wins. Having no file at all is not an error: every setting has
//! a default.

pub use tapcat_config::{Config, ResolveConfig};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Location of the configuration file relative to a project directory.
pub const CONFIG_PATH: &str = ".config/tapcat.styx";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Syntax(String),
}

/// Parse an in-memory configuration document.
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    parse_document(content).map_err(ConfigError::Syntax)
}

/// Read and parse the configuration file at `path`.
pub fn read(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content).map_err(|message| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    })
}

/// The closest `.config/tapcat.styx` at or above `start`.
pub fn find(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_PATH))
        .find(|candidate| candidate.is_file())
}

/// Find and read the closest configuration file, if there is one.
pub fn discover(start: &Path) -> Result<Option<(Config, PathBuf)>, ConfigError> {
    let Some(path) = find(start) else {
        tracing::debug!(start = %start.display(), "no tapcat config found");
        return Ok(None);
    };
    let config = read(&path)?;
    tracing::debug!(path = %path.display(), "loaded tapcat config");
    Ok(Some((config, path)))
}

fn parse_document(content: &str) -> Result<Config, String> {
    facet_styx::from_str(content).map_err(|e| e.to_string())
}
