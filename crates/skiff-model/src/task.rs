//! Task configuration: the template every instance of a job is launched from.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::job::{Identity, JobKey};
use crate::resource::{Resource, ResourceType};

/// Name of the constraint that pins tasks to hosts reserved for a role.
pub const DEDICATED_ATTRIBUTE: &str = "dedicated";

/// Container kinds a task can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    /// The resource manager's native containerizer.
    Mesos,
    /// A Docker image.
    Docker,
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mesos => f.write_str("MESOS"),
            Self::Docker => f.write_str("DOCKER"),
        }
    }
}

/// A single `--name=value` parameter passed to the Docker daemon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DockerParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

impl DockerParameter {
    /// Creates a new parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Docker container settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerContainer {
    /// Image reference.
    #[serde(default)]
    pub image: String,
    /// Extra daemon parameters.
    #[serde(default)]
    pub parameters: Vec<DockerParameter>,
}

impl DockerContainer {
    /// Creates a container for `image` with no parameters.
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(DockerParameter::new(name, value));
        self
    }
}

/// The container a task runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Native containerizer.
    Mesos,
    /// Docker image.
    Docker(DockerContainer),
}

impl Container {
    /// Returns the container type.
    #[must_use]
    pub const fn container_type(&self) -> ContainerType {
        match self {
            Self::Mesos => ContainerType::Mesos,
            Self::Docker(_) => ContainerType::Docker,
        }
    }

    /// Returns the Docker settings if this is a Docker container.
    #[must_use]
    pub const fn docker(&self) -> Option<&DockerContainer> {
        match self {
            Self::Docker(docker) => Some(docker),
            Self::Mesos => None,
        }
    }
}

/// Which executor runs the task and its opaque configuration blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Executor name, resolved against the executor registry.
    #[serde(default)]
    pub name: String,
    /// Executor-specific payload.
    #[serde(default)]
    pub data: String,
}

impl ExecutorConfig {
    /// Creates a new executor configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Constraint on the value of a host attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueConstraint {
    /// Whether the match is inverted.
    #[serde(default)]
    pub negated: bool,
    /// Accepted attribute values.
    pub values: BTreeSet<String>,
}

/// Constraint on how many instances share an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitConstraint {
    /// Maximum instances per attribute value.
    pub limit: i32,
}

/// Predicate half of a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskConstraint {
    /// Attribute value match.
    Value(ValueConstraint),
    /// Attribute spread limit.
    Limit(LimitConstraint),
}

/// A named placement constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Host attribute name.
    pub name: String,
    /// Predicate on the attribute.
    pub constraint: TaskConstraint,
}

impl Constraint {
    /// Creates a value constraint.
    #[must_use]
    pub fn value<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constraint: TaskConstraint::Value(ValueConstraint {
                negated: false,
                values: values.into_iter().map(Into::into).collect(),
            }),
        }
    }

    /// Creates a limit constraint.
    #[must_use]
    pub fn limit(name: impl Into<String>, limit: i32) -> Self {
        Self {
            name: name.into(),
            constraint: TaskConstraint::Limit(LimitConstraint { limit }),
        }
    }

    /// Creates a `dedicated` constraint for `value` (e.g. `role/pool`).
    #[must_use]
    pub fn dedicated(value: impl Into<String>) -> Self {
        Self::value(DEDICATED_ATTRIBUTE, [value.into()])
    }
}

/// A URI fetched into the task sandbox before launch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherUri {
    /// The URI.
    pub value: String,
    /// Whether to extract archives.
    #[serde(default)]
    pub extract: Option<bool>,
    /// Whether to cache the download.
    #[serde(default)]
    pub cache: Option<bool>,
}

impl FetcherUri {
    /// Creates a fetcher URI with default flags.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extract: None,
            cache: None,
        }
    }
}

/// Free-form key/value metadata.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Metadata {
    /// Key.
    pub key: String,
    /// Value.
    pub value: String,
}

/// Configuration of a single task, as submitted or after admission.
///
/// The scalar `num_cpus`/`ram_mb`/`disk_mb`/`requested_ports` fields are the
/// older representation of resources; admission backfills them into
/// `resources` and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskConfig {
    /// Owning job.
    pub job: JobKey,
    /// Submitting user.
    pub owner: Option<Identity>,
    /// Scheduling tier name.
    pub tier: Option<String>,
    /// Whether the task is restarted after it exits.
    pub is_service: bool,
    /// Whether the task is production.
    pub production: bool,
    /// Priority within the role; higher is more important.
    pub priority: i32,
    /// Allowed failures before the task is abandoned, `-1` for unlimited.
    pub max_task_failures: i32,
    /// Legacy CPU field.
    pub num_cpus: Option<f64>,
    /// Legacy RAM field in megabytes.
    pub ram_mb: Option<u64>,
    /// Legacy disk field in megabytes.
    pub disk_mb: Option<u64>,
    /// Legacy requested port names.
    pub requested_ports: Option<BTreeSet<String>>,
    /// Typed resource claims.
    pub resources: Vec<Resource>,
    /// Placement constraints.
    pub constraints: Vec<Constraint>,
    /// Container settings; unset means the native container.
    pub container: Option<Container>,
    /// Executor settings; unset only for Docker tasks.
    pub executor_config: Option<ExecutorConfig>,
    /// Named links shown in the UI.
    pub task_links: BTreeMap<String, String>,
    /// URIs fetched into the sandbox.
    pub fetcher_uris: Vec<FetcherUri>,
    /// Owner contact.
    pub contact_email: Option<String>,
    /// Arbitrary metadata.
    pub metadata: BTreeSet<Metadata>,
}

impl TaskConfig {
    /// Creates an empty task configuration for `job`.
    #[must_use]
    pub fn new(job: JobKey) -> Self {
        Self {
            job,
            ..Self::default()
        }
    }

    /// Sets the tier.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
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

    /// Sets the service flag.
    #[must_use]
    pub const fn with_service(mut self, is_service: bool) -> Self {
        self.is_service = is_service;
        self
    }

    /// Adds a resource claim.
    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets the container.
    #[must_use]
    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Sets the executor configuration.
    #[must_use]
    pub fn with_executor(mut self, executor: ExecutorConfig) -> Self {
        self.executor_config = Some(executor);
        self
    }

    /// Adds a task link.
    #[must_use]
    pub fn with_link(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.task_links.insert(name.into(), url.into());
        self
    }

    /// Adds a fetcher URI.
    #[must_use]
    pub fn with_fetcher_uri(mut self, uri: FetcherUri) -> Self {
        self.fetcher_uris.push(uri);
        self
    }

    /// Returns the claims of one type.
    pub fn resources_of(&self, resource_type: ResourceType) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(move |r| r.resource_type() == resource_type)
    }

    /// Returns the names of all named-port claims.
    pub fn named_ports(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().filter_map(Resource::named_port)
    }

    /// Returns the first constraint called `name`.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Returns the executor name, if an executor is configured.
    #[must_use]
    pub fn executor_name(&self) -> Option<&str> {
        self.executor_config.as_ref().map(|e| e.name.as_str())
    }
}
