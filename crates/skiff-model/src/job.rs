//! Job identity and job-level configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::is_good_identifier;
use crate::task::TaskConfig;

/// Identifies a job by role, environment and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobKey {
    /// Owning role.
    pub role: String,
    /// Environment, e.g. `prod` or `devel`.
    pub environment: String,
    /// Job name.
    pub name: String,
}

impl JobKey {
    /// Creates a new job key.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            environment: environment.into(),
            name: name.into(),
        }
    }

    /// Returns true if every component is a good identifier.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_good_identifier(&self.role)
            && is_good_identifier(&self.environment)
            && is_good_identifier(&self.name)
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.environment, self.name)
    }
}

/// The user a job runs as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Unix user name.
    pub user: String,
}

impl Identity {
    /// Creates a new identity.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// A job submission: a task template plus instance count and scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    /// Job key.
    pub key: JobKey,
    /// Submitting user.
    #[serde(default)]
    pub owner: Option<Identity>,
    /// Cron schedule, if the job runs periodically.
    #[serde(default)]
    pub cron_schedule: Option<String>,
    /// Number of task instances.
    pub instance_count: u32,
    /// Task template shared by all instances.
    #[serde(default)]
    pub task_config: Option<TaskConfig>,
}

impl JobConfiguration {
    /// Creates a job configuration with a single instance of `task_config`.
    #[must_use]
    pub fn new(key: JobKey, task_config: TaskConfig) -> Self {
        Self {
            key,
            owner: None,
            cron_schedule: None,
            instance_count: 1,
            task_config: Some(task_config),
        }
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: Identity) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the cron schedule.
    #[must_use]
    pub fn with_cron_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.cron_schedule = Some(schedule.into());
        self
    }

    /// Sets the instance count.
    #[must_use]
    pub const fn with_instance_count(mut self, count: u32) -> Self {
        self.instance_count = count;
        self
    }

    /// Returns true if a non-empty cron schedule is set.
    #[must_use]
    pub fn is_cron(&self) -> bool {
        self.cron_schedule.as_deref().is_some_and(|s| !s.is_empty())
    }
}
