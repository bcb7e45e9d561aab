//! Admission error types with submitter-facing reasons.

use skiff_executor::ExecutorError;
use thiserror::Error;

/// Result type for admission.
pub type Result<T> = std::result::Result<T, TaskDescriptionError>;

/// Errors from the tier registry.
#[derive(Debug, Error)]
pub enum TierError {
    /// The task names a tier that is not configured.
    #[error("Invalid tier '{0}' in TaskConfig.")]
    Unknown(String),

    /// The tier config names a default tier it does not define.
    #[error("Default tier {0} is not in the tiers.")]
    MissingDefault(String),

    /// Reading the tier config failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tier config is not valid JSON for the schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A registry lookup that failed during admission.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Tier lookup failed.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Executor lookup failed.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// Why a task or job configuration was rejected.
///
/// The display form is the bare reason, suitable for returning to the submitter.
#[derive(Debug, Error)]
pub enum TaskDescriptionError {
    /// The configuration violates a rule.
    #[error("{reason}")]
    Invalid {
        /// Human-readable reason.
        reason: String,
    },

    /// A tier or executor name did not resolve.
    #[error("{reason}")]
    RegistryLookup {
        /// Human-readable reason.
        reason: String,
        /// The underlying lookup failure.
        #[source]
        source: LookupError,
    },
}

impl TaskDescriptionError {
    /// Creates a rule violation.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Wraps a failed registry lookup, reusing its message as the reason.
    #[must_use]
    pub fn registry_lookup(source: impl Into<LookupError>) -> Self {
        let source = source.into();
        Self::RegistryLookup {
            reason: source.to_string(),
            source,
        }
    }

    /// Returns the submitter-facing reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Invalid { reason } | Self::RegistryLookup { reason, .. } => reason,
        }
    }

    /// Returns true if a tier or executor name failed to resolve.
    #[must_use]
    pub const fn is_registry_lookup(&self) -> bool {
        matches!(self, Self::RegistryLookup { .. })
    }
}
