//! Transactional in-memory storage.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::store::{MutableStoreProvider, StoreProvider, StoreState};

/// Snapshot-isolated store for tasks and quotas.
///
/// Readers take a snapshot of the last commit and never wait on each other or
/// on a writer. Writers are serialized and work on a private copy that is
/// published only when the work succeeds, so a failed or panicking write
/// leaves nothing behind.
///
/// Nested writes must go through [`MutableStoreProvider::write`]; calling
/// [`Storage::write`] from inside write work on the same storage deadlocks.
#[derive(Debug, Default)]
pub struct Storage {
    committed: RwLock<Arc<StoreState>>,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&*self.committed.read())
    }

    /// Runs read work against a snapshot of committed state.
    pub fn read<T, F>(&self, work: F) -> T
    where
        F: FnOnce(&StoreProvider) -> T,
    {
        work(&StoreProvider::new(self.snapshot()))
    }

    /// Runs write work in a transaction.
    ///
    /// Changes become visible to readers only if `work` returns `Ok` and no
    /// nested write inside it failed.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, or [`StorageError::TransactionAborted`]
    /// if a nested write failed and the outer work swallowed the error.
    pub fn write<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut MutableStoreProvider) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _writer = self.write_lock.lock();
        let base = self.snapshot();
        let mut provider = MutableStoreProvider::new(Arc::clone(&base));

        let value = match work(&mut provider) {
            Ok(value) => value,
            Err(err) => {
                debug!("write failed, discarding transaction");
                return Err(err);
            }
        };
        if provider.is_aborted() {
            warn!("nested write failed, discarding transaction");
            return Err(StorageError::TransactionAborted.into());
        }

        if !provider.shares_state(&base) {
            *self.committed.write() = provider.into_state();
            debug!("committed transaction");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TaskQuery;
    use crate::store::{QuotaStore, TaskStore};
    use skiff_model::{AssignedTask, JobKey, ScheduleStatus, ScheduledTask, TaskConfig};
    use skiff_resources::ResourceVector;

    fn task(id: &str) -> ScheduledTask {
        ScheduledTask::new(
            AssignedTask::new(id, "host-a", TaskConfig::new(JobKey::new("role", "env", "job"))),
            ScheduleStatus::Running,
        )
    }

    #[test]
    fn test_write_commits_on_success() {
        let storage = Storage::new();
        storage
            .write(|store| {
                store.save_tasks([task("a")]);
                Ok::<_, StorageError>(())
            })
            .expect("write");

        assert!(storage.read(|store| store.fetch_task("a")).is_some());
    }

    #[test]
    fn test_write_returns_value() {
        let storage = Storage::new();
        let count = storage
            .write(|store| {
                store.save_tasks([task("a"), task("b")]);
                Ok::<_, StorageError>(store.fetch_tasks(&TaskQuery::all()).len())
            })
            .expect("write");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_invalid_quota_rolls_back_the_transaction() {
        let storage = Storage::new();
        let negative = ResourceVector::new(-1.0, 0, 0, 0);

        let result = storage.write(|store| {
            store.save_tasks([task("a")]);
            store.save_quota("role", negative)
        });

        assert!(matches!(result, Err(StorageError::InvalidQuota { .. })));
        storage.read(|store| {
            assert!(store.fetch_tasks(&TaskQuery::all()).is_empty());
            assert!(store.fetch_quotas().is_empty());
        });
    }

    #[test]
    fn test_swallowed_nested_failure_aborts() {
        let storage = Storage::new();
        let result = storage.write(|store| {
            store.save_tasks([task("a")]);
            let _ = store.write(|inner| -> Result<(), StorageError> {
                inner.save_tasks([task("b")]);
                Err(StorageError::TransactionAborted)
            });
            Ok(())
        });

        assert_eq!(result, Err(StorageError::TransactionAborted));
        assert!(storage.read(|store| store.fetch_tasks(&TaskQuery::all())).is_empty());
    }

    #[test]
    fn test_read_only_write_keeps_snapshot() {
        let storage = Storage::new();
        storage
            .write(|store| {
                store.save_tasks([task("a")]);
                Ok::<_, StorageError>(())
            })
            .expect("write");

        let before = storage.snapshot();
        storage
            .write(|store| Ok::<_, StorageError>(store.fetch_task("a")))
            .expect("write");
        assert!(Arc::ptr_eq(&before, &storage.snapshot()));
    }

    #[test]
    fn test_panicking_write_leaves_no_trace() {
        let storage = Storage::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), StorageError> = storage.write(|store| {
                store.save_tasks([task("a")]);
                panic!("work failed");
            });
        }));

        assert!(result.is_err());
        assert!(storage.read(|store| store.fetch_task("a")).is_none());
        storage
            .write(|store| {
                store.save_tasks([task("b")]);
                Ok::<_, StorageError>(())
            })
            .expect("writer lock released");
    }
}
