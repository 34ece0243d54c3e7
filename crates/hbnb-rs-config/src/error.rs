//! Config failures, each naming where in the load it happened.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read hbnb config {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("hbnb config is not valid JSON5: {0}")]
    Syntax(#[from] json5::Error),
    /// Valid JSON5 that does not fit the `storage`/`console` schema.
    #[error("hbnb config does not match the expected sections: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("hbnb config field `{field}` {problem}")]
    InvalidField {
        field: &'static str,
        problem: &'static str,
    },
}
