//! Cluster-wide admission policy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use skiff_model::{ContainerType, DockerParameter};

/// Operator settings that gate what submitted tasks may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterPolicy {
    /// Container types tasks may request.
    pub allowed_container_types: BTreeSet<ContainerType>,
    /// Whether tasks may pass their own Docker parameters.
    pub allow_docker_parameters: bool,
    /// Parameters applied to Docker tasks that declare none.
    pub default_docker_parameters: Vec<DockerParameter>,
    /// Whether Docker tasks must still name an executor.
    pub require_docker_use_executor: bool,
    /// Whether tasks may claim GPUs.
    pub allow_gpu_resource: bool,
    /// Whether tasks may declare their own fetcher URIs.
    pub enable_fetcher: bool,
}

impl Default for ClusterPolicy {
    fn default() -> Self {
        Self {
            allowed_container_types: BTreeSet::from([ContainerType::Mesos]),
            allow_docker_parameters: false,
            default_docker_parameters: Vec::new(),
            require_docker_use_executor: true,
            allow_gpu_resource: false,
            enable_fetcher: false,
        }
    }
}

impl ClusterPolicy {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the allowed container types.
    #[must_use]
    pub fn with_allowed_container_types(
        mut self,
        types: impl IntoIterator<Item = ContainerType>,
    ) -> Self {
        self.allowed_container_types = types.into_iter().collect();
        self
    }

    /// Sets whether tasks may pass Docker parameters.
    #[must_use]
    pub const fn with_docker_parameters_allowed(mut self, allow: bool) -> Self {
        self.allow_docker_parameters = allow;
        self
    }

    /// Adds a default Docker parameter.
    #[must_use]
    pub fn with_default_docker_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_docker_parameters
            .push(DockerParameter::new(name, value));
        self
    }

    /// Sets whether Docker tasks must name an executor.
    #[must_use]
    pub const fn with_docker_executor_required(mut self, require: bool) -> Self {
        self.require_docker_use_executor = require;
        self
    }

    /// Sets whether GPU claims are allowed.
    #[must_use]
    pub const fn with_gpu_allowed(mut self, allow: bool) -> Self {
        self.allow_gpu_resource = allow;
        self
    }

    /// Sets whether per-task fetcher URIs are allowed.
    #[must_use]
    pub const fn with_fetcher_enabled(mut self, enable: bool) -> Self {
        self.enable_fetcher = enable;
        self
    }

    /// Returns true if the container type may be used.
    #[must_use]
    pub fn allows(&self, container_type: ContainerType) -> bool {
        self.allowed_container_types.contains(&container_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_restrictive() {
        let policy = ClusterPolicy::default();
        assert!(policy.allows(ContainerType::Mesos));
        assert!(!policy.allows(ContainerType::Docker));
        assert!(!policy.allow_docker_parameters);
        assert!(policy.default_docker_parameters.is_empty());
        assert!(policy.require_docker_use_executor);
        assert!(!policy.allow_gpu_resource);
        assert!(!policy.enable_fetcher);
    }

    #[test]
    fn builder_methods() {
        let policy = ClusterPolicy::new()
            .with_allowed_container_types([ContainerType::Docker])
            .with_docker_parameters_allowed(true)
            .with_default_docker_parameter("label", "skiff")
            .with_docker_executor_required(false)
            .with_gpu_allowed(true)
            .with_fetcher_enabled(true);

        assert!(!policy.allows(ContainerType::Mesos));
        assert!(policy.allows(ContainerType::Docker));
        assert_eq!(
            policy.default_docker_parameters,
            vec![DockerParameter::new("label", "skiff")]
        );
        assert!(!policy.require_docker_use_executor);
        assert!(policy.allow_gpu_resource);
        assert!(policy.enable_fetcher);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"allowedContainerTypes": ["mesos", "docker"], "allowGpuResource": true}"#;
        let policy: ClusterPolicy = serde_json::from_str(json).expect("policy");
        assert!(policy.allows(ContainerType::Docker));
        assert!(policy.allow_gpu_resource);
        assert!(policy.require_docker_use_executor);
        assert!(!policy.enable_fetcher);
    }
}
