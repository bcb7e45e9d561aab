//! Error types for resource accounting.

use thiserror::Error;

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors that can occur while computing a resource footprint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The task does not declare a usable set of resource claims.
    #[error("malformed task: {reason}")]
    MalformedTask {
        /// Which claim is missing or duplicated.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_malformed_task() {
        let err = ResourceError::MalformedTask {
            reason: "missing numCpus resource".into(),
        };
        assert_eq!(err.to_string(), "malformed task: missing numCpus resource");
    }
}
