//! Running task state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::task::TaskConfig;

/// Lifecycle state of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    /// Waiting to be placed.
    #[default]
    Pending,
    /// Held back by a throttle.
    Throttled,
    /// Placed on a host, launch in flight.
    Assigned,
    /// Executor is starting the task.
    Starting,
    /// Running.
    Running,
    /// Being preempted.
    Preempting,
    /// Being restarted.
    Restarting,
    /// Being killed.
    Killing,
    /// Exited successfully.
    Finished,
    /// Exited with an error.
    Failed,
    /// Killed on request.
    Killed,
    /// Lost contact with the host.
    Lost,
}

impl ScheduleStatus {
    /// Returns true if the task no longer runs and never will.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Killed | Self::Lost)
    }

    /// Returns true if the task is placed and occupies host resources.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::Assigned
                | Self::Starting
                | Self::Running
                | Self::Preempting
                | Self::Restarting
                | Self::Killing
        )
    }
}

/// A task bound to a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTask {
    /// Unique task ID.
    pub task_id: String,
    /// Hostname the task was placed on.
    pub slave_host: String,
    /// Agent ID of the host.
    #[serde(default)]
    pub slave_id: String,
    /// Instance number within the job.
    #[serde(default)]
    pub instance_id: u32,
    /// Concrete ports assigned to named ports.
    #[serde(default)]
    pub assigned_ports: BTreeMap<String, u16>,
    /// Admitted configuration.
    pub task: TaskConfig,
}

impl AssignedTask {
    /// Creates an assignment of `task` to `host`.
    #[must_use]
    pub fn new(task_id: impl Into<String>, host: impl Into<String>, task: TaskConfig) -> Self {
        Self {
            task_id: task_id.into(),
            slave_host: host.into(),
            task,
            ..Self::default()
        }
    }
}

/// A task together with its lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    /// The assignment.
    pub assigned_task: AssignedTask,
    /// Current state.
    pub status: ScheduleStatus,
    /// Number of failures so far.
    #[serde(default)]
    pub failure_count: u32,
    /// Task ID this one replaced, if any.
    #[serde(default)]
    pub ancestor_id: Option<String>,
}

impl ScheduledTask {
    /// Wraps an assignment with the given status.
    #[must_use]
    pub fn new(assigned_task: AssignedTask, status: ScheduleStatus) -> Self {
        Self {
            assigned_task,
            status,
            failure_count: 0,
            ancestor_id: None,
        }
    }

    /// Returns the task ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.assigned_task.task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_active_are_disjoint() {
        let all = [
            ScheduleStatus::Pending,
            ScheduleStatus::Throttled,
            ScheduleStatus::Assigned,
            ScheduleStatus::Starting,
            ScheduleStatus::Running,
            ScheduleStatus::Preempting,
            ScheduleStatus::Restarting,
            ScheduleStatus::Killing,
            ScheduleStatus::Finished,
            ScheduleStatus::Failed,
            ScheduleStatus::Killed,
            ScheduleStatus::Lost,
        ];
        for status in all {
            assert!(!(status.is_terminal() && status.is_active()), "{status:?}");
        }
        assert!(ScheduleStatus::Running.is_active());
        assert!(ScheduleStatus::Lost.is_terminal());
        assert!(!ScheduleStatus::Pending.is_active());
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_string(&ScheduleStatus::Running).unwrap_or_default();
        assert_eq!(json, "\"RUNNING\"");
    }
}
