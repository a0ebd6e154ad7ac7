//! Errors raised to callers.
//!
//! Conversion of a well-formed tree never fails: unsupported constructs are
//! passed through and reported as [`Diagnostic`](crate::Diagnostic)s. The
//! errors here are contract violations by the caller.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid input: {0}")]
    Input(#[from] serde_json::Error),

    #[error("method `{method}` has no body to convert")]
    MissingBody { method: String },

    #[error("component declaration has no name")]
    MissingName,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
