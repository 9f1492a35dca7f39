//! Error types for sitekit

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the sitekit Error
pub type Result<T> = std::result::Result<T, Error>;

/// sitekit error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("{what} {} is missing.", .path.display())]
    MissingPrecondition { what: String, path: PathBuf },

    #[error("Drush command failed; aborting: {0}")]
    FeatureCheckFailed(String),

    #[error("Workflow QA users requested, but {module} not enabled.")]
    WorkflowNotEnabled { module: String },

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
