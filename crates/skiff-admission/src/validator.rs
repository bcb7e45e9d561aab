//! The admission pipeline.
//!
//! [`ConfigValidator::validate_task`] runs a fixed sequence of checks over a
//! copy of the submitted task, defaulting fields along the way. The first
//! failing check rejects the whole task. Required fields are checked before
//! any semantic rule so the most actionable reason is reported first.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use skiff_executor::ExecutorLookup;
use skiff_model::{
    is_good_identifier, Container, ContainerType, JobConfiguration, Resource, ResourceType,
    TaskConfig, TaskConstraint, DEDICATED_ATTRIBUTE,
};
use tracing::debug;

use crate::backfill::{Backfill, LegacyResourceBackfill};
use crate::error::{Result, TaskDescriptionError};
use crate::policy::ClusterPolicy;
use crate::tier::TierLookup;

/// Rejection when a Docker task passes parameters the cluster disallows.
pub const NO_DOCKER_PARAMETERS: &str = "This scheduler is configured to disallow Docker parameters.";

/// Rejection when a Docker task has no executor but the cluster requires one.
pub const EXECUTOR_REQUIRED_WITH_DOCKER: &str =
    "This scheduler is configured to require an executor for Docker-based tasks.";

/// Rejection when a task declares fetcher URIs but the fetcher is disabled.
pub const FETCHER_DISABLED: &str = "Mesos Fetcher for individual jobs is disabled in this cluster.";

/// Rejection when a task has neither an executor nor a Docker container.
pub const NO_EXECUTOR_OR_CONTAINER: &str = "Configuration may not be null.";

/// Rejection when the executor config has an empty name.
pub const INVALID_EXECUTOR_CONFIG: &str = "Executor name may not be left unset.";

/// Rejection when a task claims GPUs but GPU support is disabled.
pub const GPU_DISABLED: &str = "GPU resource support is disabled in this cluster.";

/// Link templates filled in for well-known port names.
static DEFAULT_LINKS: [(&str, &str); 2] = [
    ("health", "http://%host%:%port:health%"),
    ("http", "http://%host%:%port:http%"),
];

/// Validates submitted configurations and produces canonical ones.
///
/// Holds no mutable state; one validator can serve concurrent admissions.
pub struct ConfigValidator {
    policy: ClusterPolicy,
    tiers: Arc<dyn TierLookup>,
    executors: Arc<dyn ExecutorLookup>,
    backfill: Arc<dyn Backfill>,
}

impl ConfigValidator {
    /// Creates a validator using [`LegacyResourceBackfill`].
    #[must_use]
    pub fn new(
        policy: ClusterPolicy,
        tiers: Arc<dyn TierLookup>,
        executors: Arc<dyn ExecutorLookup>,
    ) -> Self {
        Self {
            policy,
            tiers,
            executors,
            backfill: Arc::new(LegacyResourceBackfill),
        }
    }

    /// Replaces the backfill step.
    #[must_use]
    pub fn with_backfill(mut self, backfill: Arc<dyn Backfill>) -> Self {
        self.backfill = backfill;
        self
    }

    /// The policy this validator enforces.
    #[must_use]
    pub const fn policy(&self) -> &ClusterPolicy {
        &self.policy
    }

    /// Validates a job and its task template.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDescriptionError`] describing the first rule the job breaks.
    pub fn validate_job(&self, job: &JobConfiguration) -> Result<JobConfiguration> {
        let Some(task) = &job.task_config else {
            return Err(TaskDescriptionError::invalid(
                "Job configuration must have taskConfig set.",
            ));
        };
        if job.instance_count == 0 {
            return Err(TaskDescriptionError::invalid("Instance count must be positive."));
        }
        if !job.key.is_valid() {
            return Err(TaskDescriptionError::invalid(format!(
                "Job key {} is invalid.",
                job.key
            )));
        }
        if let Some(owner) = &job.owner {
            if !is_good_identifier(&owner.user) {
                return Err(TaskDescriptionError::invalid(format!(
                    "Job user contains illegal characters: {}",
                    owner.user
                )));
            }
        }

        let task = self.validate_task(task)?;
        if job.is_cron() && task.is_service {
            return Err(TaskDescriptionError::invalid(format!(
                "A service task may not be run on a cron schedule: {}",
                job.key
            )));
        }

        Ok(JobConfiguration {
            task_config: Some(task),
            ..job.clone()
        })
    }

    /// Validates a task and returns its canonical form.
    ///
    /// The input is never modified. Validating a canonical task returns an
    /// equal task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDescriptionError`] describing the first rule the task
    /// breaks, or [`TaskDescriptionError::RegistryLookup`] if its tier or
    /// executor does not resolve.
    pub fn validate_task(&self, task: &TaskConfig) -> Result<TaskConfig> {
        let mut task = task.clone();

        if task.requested_ports.is_none() {
            task.requested_ports = Some(BTreeSet::new());
        }

        self.check_tier(&task)?;
        if !task.job.is_valid() {
            return Err(TaskDescriptionError::invalid(format!(
                "Job key {} is invalid.",
                task.job
            )));
        }
        self.check_executor(&task)?;
        check_required_fields(&task)?;
        check_dedicated_constraint(&task)?;
        self.check_container(&mut task)?;

        self.backfill.backfill_task(&mut task);

        check_multiplicity(&task)?;
        self.check_feature_gates(&task)?;
        fill_default_links(&mut task);

        debug!(job = %task.job, tier = ?task.tier, "admitted task config");
        Ok(task)
    }

    fn check_tier(&self, task: &TaskConfig) -> Result<()> {
        if let Some(tier) = &task.tier {
            if !is_good_identifier(tier) {
                return Err(TaskDescriptionError::invalid(format!(
                    "Tier contains illegal characters: {tier}"
                )));
            }
        }
        self.tiers
            .get_tier(task)
            .map(|_| ())
            .map_err(TaskDescriptionError::registry_lookup)
    }

    fn check_executor(&self, task: &TaskConfig) -> Result<()> {
        let is_docker = matches!(task.container, Some(Container::Docker(_)));
        let Some(executor) = &task.executor_config else {
            if is_docker {
                return Ok(());
            }
            return Err(TaskDescriptionError::invalid(NO_EXECUTOR_OR_CONTAINER));
        };
        if executor.name.is_empty() {
            return Err(TaskDescriptionError::invalid(INVALID_EXECUTOR_CONFIG));
        }
        self.executors
            .get(&executor.name)
            .map(|_| ())
            .map_err(TaskDescriptionError::registry_lookup)
    }

    fn check_container(&self, task: &mut TaskConfig) -> Result<()> {
        let has_executor = task.executor_config.is_some();
        let container_type = match &mut task.container {
            Some(Container::Docker(docker)) => {
                if docker.image.is_empty() {
                    return Err(TaskDescriptionError::invalid(
                        "A container must specify an image.",
                    ));
                }
                if docker.parameters.is_empty() {
                    docker
                        .parameters
                        .clone_from(&self.policy.default_docker_parameters);
                } else if !self.policy.allow_docker_parameters
                    && docker.parameters != self.policy.default_docker_parameters
                {
                    return Err(TaskDescriptionError::invalid(NO_DOCKER_PARAMETERS));
                }
                if self.policy.require_docker_use_executor && !has_executor {
                    return Err(TaskDescriptionError::invalid(EXECUTOR_REQUIRED_WITH_DOCKER));
                }
                ContainerType::Docker
            }
            Some(Container::Mesos) | None => ContainerType::Mesos,
        };

        if !self.policy.allows(container_type) {
            return Err(TaskDescriptionError::invalid(format!(
                "This scheduler is not configured to allow the container type {container_type}"
            )));
        }
        Ok(())
    }

    fn check_feature_gates(&self, task: &TaskConfig) -> Result<()> {
        if !self.policy.allow_gpu_resource && task.resources_of(ResourceType::Gpus).next().is_some()
        {
            return Err(TaskDescriptionError::invalid(GPU_DISABLED));
        }
        if !self.policy.enable_fetcher && !task.fetcher_uris.is_empty() {
            return Err(TaskDescriptionError::invalid(FETCHER_DISABLED));
        }
        Ok(())
    }
}

/// Claims win over legacy fields, matching what the backfill keeps.
fn check_required_fields(task: &TaskConfig) -> Result<()> {
    let cpus = task
        .resources
        .iter()
        .find_map(|r| match r {
            Resource::NumCpus(v) => Some(*v),
            _ => None,
        })
        .or(task.num_cpus);
    let ram = task
        .resources
        .iter()
        .find_map(|r| match r {
            Resource::RamMb(v) => Some(*v),
            _ => None,
        })
        .or(task.ram_mb);
    let disk = task
        .resources
        .iter()
        .find_map(|r| match r {
            Resource::DiskMb(v) => Some(*v),
            _ => None,
        })
        .or(task.disk_mb);

    require_positive("num_cpus", cpus.map(|v| v > 0.0))?;
    require_positive("ram_mb", ram.map(|v| v > 0))?;
    require_positive("disk_mb", disk.map(|v| v > 0))
}

fn require_positive(label: &str, positive: Option<bool>) -> Result<()> {
    match positive {
        None => Err(TaskDescriptionError::invalid(format!(
            "Field {label} is required."
        ))),
        Some(false) => Err(TaskDescriptionError::invalid(format!(
            "{label} must be greater than 0.0"
        ))),
        Some(true) => Ok(()),
    }
}

fn check_dedicated_constraint(task: &TaskConfig) -> Result<()> {
    let Some(constraint) = task.constraint(DEDICATED_ATTRIBUTE) else {
        return Ok(());
    };
    let TaskConstraint::Value(value) = &constraint.constraint else {
        return Err(TaskDescriptionError::invalid(
            "A dedicated constraint must be of value type.",
        ));
    };
    let mut values = value.values.iter();
    let (Some(only), None) = (values.next(), values.next()) else {
        return Err(TaskDescriptionError::invalid(
            "A dedicated constraint must have exactly one value",
        ));
    };

    let role = only.split('/').next().unwrap_or_default();
    if role == "*" || role == task.job.role {
        Ok(())
    } else {
        Err(TaskDescriptionError::invalid(format!(
            "Only {role} may use hosts dedicated for that role."
        )))
    }
}

fn check_multiplicity(task: &TaskConfig) -> Result<()> {
    let mut counts: BTreeMap<ResourceType, usize> = BTreeMap::new();
    for resource in &task.resources {
        *counts.entry(resource.resource_type()).or_default() += 1;
    }
    let mut offending: Vec<&str> = counts
        .into_iter()
        .filter(|(t, n)| !t.is_multiple_allowed() && *n > 1)
        .map(|(t, _)| t.display_name())
        .collect();
    if offending.is_empty() {
        return Ok(());
    }
    offending.sort_unstable();
    Err(TaskDescriptionError::invalid(format!(
        "Multiple resource values are not supported for {}",
        offending.join(", ")
    )))
}

fn fill_default_links(task: &mut TaskConfig) {
    if !task.task_links.is_empty() {
        return;
    }
    let links: BTreeMap<String, String> = task
        .named_ports()
        .filter_map(|port| DEFAULT_LINKS.iter().find(|(name, _)| *name == port))
        .map(|(name, url)| ((*name).to_string(), (*url).to_string()))
        .collect();
    task.task_links = links;
}
