//! Task queries.

use std::collections::{BTreeSet, HashSet};

use skiff_model::{JobKey, ScheduleStatus, ScheduledTask};

/// Selects scheduled tasks. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Task ids to match.
    pub task_ids: Option<BTreeSet<String>>,
    /// Owning role.
    pub role: Option<String>,
    /// Environment.
    pub environment: Option<String>,
    /// Job name.
    pub job_name: Option<String>,
    /// Statuses to match. Empty matches any status.
    pub statuses: HashSet<ScheduleStatus>,
    /// Host the task is assigned to.
    pub slave_host: Option<String>,
}

impl TaskQuery {
    /// Matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches the given task ids.
    #[must_use]
    pub fn task_scoped<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task_ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Matches tasks owned by `role`.
    #[must_use]
    pub fn role_scoped(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    /// Matches tasks of one job.
    #[must_use]
    pub fn job_scoped(job: &JobKey) -> Self {
        Self {
            role: Some(job.role.clone()),
            environment: Some(job.environment.clone()),
            job_name: Some(job.name.clone()),
            ..Self::default()
        }
    }

    /// Active tasks assigned to `host`.
    #[must_use]
    pub fn active_on_host(host: impl Into<String>) -> Self {
        Self::default()
            .with_host(host)
            .with_statuses([
                ScheduleStatus::Assigned,
                ScheduleStatus::Starting,
                ScheduleStatus::Running,
                ScheduleStatus::Preempting,
                ScheduleStatus::Restarting,
                ScheduleStatus::Killing,
            ])
    }

    /// Restricts the query to the given statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = ScheduleStatus>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    /// Restricts the query to one host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.slave_host = Some(host.into());
        self
    }

    /// Returns true if `task` satisfies every set field.
    #[must_use]
    pub fn matches(&self, task: &ScheduledTask) -> bool {
        let assigned = &task.assigned_task;
        let job = &assigned.task.job;

        self.task_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&assigned.task_id))
            && self.role.as_ref().is_none_or(|r| *r == job.role)
            && self.environment.as_ref().is_none_or(|e| *e == job.environment)
            && self.job_name.as_ref().is_none_or(|n| *n == job.name)
            && (self.statuses.is_empty() || self.statuses.contains(&task.status))
            && self.slave_host.as_ref().is_none_or(|h| *h == assigned.slave_host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_model::{AssignedTask, TaskConfig};
    use test_case::test_case;

    fn task(id: &str, host: &str, job: JobKey, status: ScheduleStatus) -> ScheduledTask {
        ScheduledTask::new(AssignedTask::new(id, host, TaskConfig::new(job)), status)
    }

    fn running() -> ScheduledTask {
        task(
            "t1",
            "host-a",
            JobKey::new("www-data", "prod", "hello"),
            ScheduleStatus::Running,
        )
    }

    #[test_case(TaskQuery::all(), true ; "all")]
    #[test_case(TaskQuery::task_scoped(["t1", "t2"]), true ; "id listed")]
    #[test_case(TaskQuery::task_scoped(["t2"]), false ; "id not listed")]
    #[test_case(TaskQuery::role_scoped("www-data"), true ; "same role")]
    #[test_case(TaskQuery::role_scoped("other"), false ; "other role")]
    #[test_case(TaskQuery::job_scoped(&JobKey::new("www-data", "prod", "hello")), true ; "same job")]
    #[test_case(TaskQuery::job_scoped(&JobKey::new("www-data", "devel", "hello")), false ; "other environment")]
    #[test_case(TaskQuery::active_on_host("host-a"), true ; "active on host")]
    #[test_case(TaskQuery::active_on_host("host-b"), false ; "active elsewhere")]
    #[test_case(TaskQuery::all().with_statuses([ScheduleStatus::Pending]), false ; "status mismatch")]
    fn test_matches(query: TaskQuery, expected: bool) {
        assert_eq!(query.matches(&running()), expected);
    }

    #[test]
    fn test_active_on_host_skips_terminal_tasks() {
        let finished = task(
            "t1",
            "host-a",
            JobKey::new("www-data", "prod", "hello"),
            ScheduleStatus::Finished,
        );
        assert!(!TaskQuery::active_on_host("host-a").matches(&finished));
    }
}
