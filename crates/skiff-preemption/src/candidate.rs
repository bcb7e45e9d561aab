//! Preemption candidates and pending tasks.

use serde::{Deserialize, Serialize};
use skiff_model::{AssignedTask, TaskConfig};
use skiff_resources::{ResourceError, ResourceVector};

/// A running task viewed as a possible preemption victim.
///
/// A pure projection of an [`AssignedTask`]; two candidates are equal when
/// every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreemptionCandidate {
    /// Host the task runs on.
    pub host: String,
    /// Whether the task is production.
    pub production: bool,
    /// Owning role.
    pub role: String,
    /// Priority within the role.
    pub priority: i32,
    /// Task footprint, without executor overhead.
    pub resources: ResourceVector,
    /// Task ID.
    pub task_id: String,
    /// Executor name; absent for executor-less Docker tasks.
    pub executor_name: Option<String>,
}

impl PreemptionCandidate {
    /// Creates a non-production, priority-zero candidate.
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        host: impl Into<String>,
        role: impl Into<String>,
        resources: ResourceVector,
    ) -> Self {
        Self {
            host: host.into(),
            production: false,
            role: role.into(),
            priority: 0,
            resources,
            task_id: task_id.into(),
            executor_name: None,
        }
    }

    /// Projects a running task.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MalformedTask`] if the task's resource claims
    /// do not yield a footprint.
    pub fn from_task(task: &AssignedTask) -> Result<Self, ResourceError> {
        let config = &task.task;
        Ok(Self {
            host: task.slave_host.clone(),
            production: config.production,
            role: config.job.role.clone(),
            priority: config.priority,
            resources: ResourceVector::from_task(config)?,
            task_id: task.task_id.clone(),
            executor_name: config.executor_name().map(str::to_string),
        })
    }

    /// Sets the production flag.
    #[must_use]
    pub const fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the executor name.
    #[must_use]
    pub fn with_executor(mut self, name: impl Into<String>) -> Self {
        self.executor_name = Some(name.into());
        self
    }
}

/// A task waiting for capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTask {
    /// Owning role.
    pub role: String,
    /// Whether the task is production.
    pub production: bool,
    /// Priority within the role.
    pub priority: i32,
    /// Task footprint, without executor overhead.
    pub resources: ResourceVector,
    /// Executor name, if any.
    pub executor_name: Option<String>,
}

impl PendingTask {
    /// Projects a pending task configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MalformedTask`] if the task's resource claims
    /// do not yield a footprint.
    pub fn from_task(task: &TaskConfig) -> Result<Self, ResourceError> {
        Ok(Self {
            role: task.job.role.clone(),
            production: task.production,
            priority: task.priority,
            resources: ResourceVector::from_task(task)?,
            executor_name: task.executor_name().map(str::to_string),
        })
    }

    /// Returns true if this task may evict `victim`.
    ///
    /// Production tasks may evict any non-production task. Otherwise a
    /// non-production task may evict a non-production task of its own role
    /// with strictly lower priority.
    #[must_use]
    pub fn can_preempt(&self, victim: &PreemptionCandidate) -> bool {
        if victim.production {
            return false;
        }
        if self.production {
            return true;
        }
        self.role == victim.role && self.priority > victim.priority
    }
}
