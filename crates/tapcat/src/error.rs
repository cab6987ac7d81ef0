use tapcat_catalog::InclusionError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    /// Discovery reported a column with an inclusion tag we cannot honor.
    ///
    /// This means the discovery contract is broken, so the whole resolution
    /// is abandoned.
    #[error("stream {stream} column {column}: {source}")]
    Inclusion {
        stream: String,
        column: String,
        #[source]
        source: InclusionError,
    },

    #[error("stream {stream} has no recorded column order")]
    MissingColumnOrder { stream: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
