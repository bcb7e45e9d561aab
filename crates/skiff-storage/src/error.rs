//! Error types for the skiff-storage crate.

use thiserror::Error;

/// Errors raised by the transactional store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A nested write failed, so the enclosing transaction was discarded.
    #[error("transaction aborted by a failed nested write")]
    TransactionAborted,

    /// A quota was rejected before it reached the store.
    #[error("invalid quota for role '{role}': {reason}")]
    InvalidQuota {
        /// Role the quota was saved for.
        role: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_aborted_display() {
        let err = StorageError::TransactionAborted;
        assert!(err.to_string().contains("nested write"));
    }

    #[test]
    fn test_invalid_quota_display() {
        let err = StorageError::InvalidQuota {
            role: "www-data".to_string(),
            reason: "negative ram".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("www-data"));
        assert!(msg.contains("negative ram"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
