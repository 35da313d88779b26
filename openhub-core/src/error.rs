//! Error types for openhub-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file did not exist at the given path.
    #[error("configuration not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the configuration file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file path.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A service name that cannot be used as a directory name.
    #[error("invalid service name '{service}': must not contain '/' or '\\' nor be '.' or '..'")]
    InvalidName { service: String },

    /// A service entry lacks a mandatory field.
    #[error("{service} service does not provide {field}")]
    MissingField {
        service: String,
        field: &'static str,
    },
}
