//! Store contents and the read/write views handed to storage work.

use std::collections::BTreeMap;
use std::sync::Arc;

use skiff_model::ScheduledTask;
use skiff_resources::ResourceVector;

use crate::error::{Result, StorageError};
use crate::query::TaskQuery;

/// Everything the store holds. Cloned on the first mutation of a transaction.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    tasks: BTreeMap<String, ScheduledTask>,
    quotas: BTreeMap<String, ResourceVector>,
}

/// Read access to scheduled tasks.
pub trait TaskStore {
    /// Returns every task matching `query`, ordered by task id.
    fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask>;

    /// Returns one task by id.
    fn fetch_task(&self, task_id: &str) -> Option<ScheduledTask>;
}

/// Read access to per-role quotas.
pub trait QuotaStore {
    /// Returns the quota of `role`, if one was saved.
    fn fetch_quota(&self, role: &str) -> Option<ResourceVector>;

    /// Returns every saved quota keyed by role.
    fn fetch_quotas(&self) -> BTreeMap<String, ResourceVector>;
}

impl TaskStore for StoreState {
    fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask> {
        match &query.task_ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.tasks.get(id))
                .filter(|task| query.matches(task))
                .cloned()
                .collect(),
            None => self
                .tasks
                .values()
                .filter(|task| query.matches(task))
                .cloned()
                .collect(),
        }
    }

    fn fetch_task(&self, task_id: &str) -> Option<ScheduledTask> {
        self.tasks.get(task_id).cloned()
    }
}

impl QuotaStore for StoreState {
    fn fetch_quota(&self, role: &str) -> Option<ResourceVector> {
        self.quotas.get(role).copied()
    }

    fn fetch_quotas(&self) -> BTreeMap<String, ResourceVector> {
        self.quotas.clone()
    }
}

/// A consistent snapshot of committed state, handed to read work.
///
/// Later commits are never visible through a provider that already exists.
#[derive(Debug, Clone)]
pub struct StoreProvider {
    state: Arc<StoreState>,
}

impl StoreProvider {
    pub(crate) const fn new(state: Arc<StoreState>) -> Self {
        Self { state }
    }
}

impl TaskStore for StoreProvider {
    fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask> {
        self.state.fetch_tasks(query)
    }

    fn fetch_task(&self, task_id: &str) -> Option<ScheduledTask> {
        self.state.fetch_task(task_id)
    }
}

impl QuotaStore for StoreProvider {
    fn fetch_quota(&self, role: &str) -> Option<ResourceVector> {
        self.state.fetch_quota(role)
    }

    fn fetch_quotas(&self) -> BTreeMap<String, ResourceVector> {
        self.state.fetch_quotas()
    }
}

/// The working copy of one write transaction.
///
/// Reads see the transaction's own uncommitted changes.
#[derive(Debug)]
pub struct MutableStoreProvider {
    state: Arc<StoreState>,
    aborted: bool,
}

impl MutableStoreProvider {
    pub(crate) const fn new(state: Arc<StoreState>) -> Self {
        Self {
            state,
            aborted: false,
        }
    }

    pub(crate) const fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub(crate) fn into_state(self) -> Arc<StoreState> {
        self.state
    }

    pub(crate) fn shares_state(&self, other: &Arc<StoreState>) -> bool {
        Arc::ptr_eq(&self.state, other)
    }

    fn state_mut(&mut self) -> &mut StoreState {
        Arc::make_mut(&mut self.state)
    }

    /// Runs nested work inside this transaction.
    ///
    /// The work shares the enclosing working copy. If it fails, the whole
    /// enclosing transaction is discarded even when the caller recovers from
    /// the error.
    ///
    /// # Errors
    ///
    /// Returns whatever `work` returns.
    pub fn write<T, E, F>(&mut self, work: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
    {
        let result = work(self);
        if result.is_err() {
            self.aborted = true;
        }
        result
    }

    /// Inserts or replaces tasks by id.
    pub fn save_tasks(&mut self, tasks: impl IntoIterator<Item = ScheduledTask>) {
        let state = self.state_mut();
        for task in tasks {
            state.tasks.insert(task.id().to_string(), task);
        }
    }

    /// Removes tasks by id, returning how many existed.
    pub fn delete_tasks<I, S>(&mut self, task_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = self.state_mut();
        task_ids
            .into_iter()
            .filter(|id| state.tasks.remove(id.as_ref()).is_some())
            .count()
    }

    /// Removes every task.
    pub fn delete_all_tasks(&mut self) {
        self.state_mut().tasks.clear();
    }

    /// Saves the quota of `role`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidQuota`] if any dimension is negative.
    pub fn save_quota(&mut self, role: impl Into<String>, quota: ResourceVector) -> Result<()> {
        let role = role.into();
        if !quota.is_non_negative() {
            return Err(StorageError::InvalidQuota {
                role,
                reason: format!("negative dimension in {quota}"),
            });
        }
        self.state_mut().quotas.insert(role, quota);
        Ok(())
    }

    /// Removes the quota of `role`, returning it if one was saved.
    pub fn remove_quota(&mut self, role: &str) -> Option<ResourceVector> {
        self.state_mut().quotas.remove(role)
    }
}

impl TaskStore for MutableStoreProvider {
    fn fetch_tasks(&self, query: &TaskQuery) -> Vec<ScheduledTask> {
        self.state.fetch_tasks(query)
    }

    fn fetch_task(&self, task_id: &str) -> Option<ScheduledTask> {
        self.state.fetch_task(task_id)
    }
}

impl QuotaStore for MutableStoreProvider {
    fn fetch_quota(&self, role: &str) -> Option<ResourceVector> {
        self.state.fetch_quota(role)
    }

    fn fetch_quotas(&self) -> BTreeMap<String, ResourceVector> {
        self.state.fetch_quotas()
    }
}
