//! Error types for executor configuration.

use thiserror::Error;

/// Errors that can occur while loading or looking up executors.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// No executor is registered under the name.
    #[error("Configuration for executor '{0}' doesn't exist.")]
    NotFound(String),

    /// A launch command could not be built.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A mount string could not be parsed.
    #[error("invalid mount '{0}'")]
    InvalidMount(String),

    /// An executor entry is structurally valid JSON but unusable.
    #[error("invalid config for executor '{name}': {reason}")]
    InvalidConfig {
        /// Executor name.
        name: String,
        /// Why the entry was rejected.
        reason: String,
    },

    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for the schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for executor operations.
pub type Result<T> = std::result::Result<T, ExecutorError>;
