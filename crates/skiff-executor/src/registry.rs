//! The executor registry and its JSON loader.
//!
//! A registry is loaded once and never mutated. Hot reload goes through
//! [`ExecutorRegistryHandle`], which swaps in a whole new registry so readers
//! never observe a partially updated one.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use skiff_resources::ResourceVector;
use tracing::{debug, info, warn};

use crate::error::{ExecutorError, Result};
use crate::mount::Mount;
use crate::profile::{
    CommandInfo, ExecutorProfile, FetchResource, DEFAULT_COMMAND_BASE_PATH, THERMOS_EXECUTOR,
};

/// Read access to executor profiles by name.
pub trait ExecutorLookup: Send + Sync {
    /// Returns true if an executor is registered under `name`.
    fn exists(&self, name: &str) -> bool;

    /// Returns the profile registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::NotFound`] if no such executor exists.
    fn get(&self, name: &str) -> Result<Arc<ExecutorProfile>>;
}

/// Immutable map of executor name to profile.
#[derive(Debug, Clone, Default)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, Arc<ExecutorProfile>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryFile {
    executors: BTreeMap<String, ExecutorEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutorEntry {
    command: Vec<String>,
    #[serde(default)]
    resources: Vec<FetchResource>,
    #[serde(default)]
    overhead: ResourceVector,
    #[serde(default)]
    global_container_mounts: Vec<String>,
    #[serde(default)]
    observer_root: Option<String>,
    #[serde(default)]
    config: BTreeMap<String, String>,
}

impl ExecutorEntry {
    fn into_profile(self, name: &str) -> Result<ExecutorProfile> {
        let invalid = |reason: &str| ExecutorError::InvalidConfig {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self.command.is_empty() {
            return Err(invalid("command is empty"));
        }
        if !self.overhead.is_non_negative() {
            return Err(invalid("overhead must not be negative"));
        }
        let observer_root = self.observer_root.unwrap_or_default();
        if name == THERMOS_EXECUTOR && observer_root.is_empty() {
            return Err(invalid("observerRoot is required"));
        }

        let command = CommandInfo::create(&self.command, &self.resources, DEFAULT_COMMAND_BASE_PATH)
            .map_err(|e| invalid(&e.to_string()))?;

        let mut profile = ExecutorProfile::new(name, command)
            .with_overhead(self.overhead)
            .with_observer_root(observer_root);
        for raw in &self.global_container_mounts {
            match Mount::parse(raw) {
                Ok(mount) => profile = profile.with_mount(mount),
                Err(e) => warn!(executor = %name, mount = %raw, error = %e, "skipping container mount"),
            }
        }
        profile.config = self.config;
        Ok(profile)
    }
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile, replacing any existing profile of the same name.
    #[must_use]
    pub fn with_profile(mut self, profile: ExecutorProfile) -> Self {
        self.executors
            .insert(profile.name.clone(), Arc::new(profile));
        self
    }

    /// Parses a registry from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Parse`] for malformed JSON and
    /// [`ExecutorError::InvalidConfig`] for an unusable executor entry.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (name, entry) in file.executors {
            let profile = entry.into_profile(&name)?;
            debug!(executor = %name, overhead = %profile.overhead, "registered executor");
            registry = registry.with_profile(profile);
        }
        Ok(registry)
    }

    /// Loads a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Io`] if the file cannot be read, otherwise as
    /// [`ExecutorRegistry::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let registry = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            count = registry.len(),
            "loaded executor registry"
        );
        Ok(registry)
    }

    /// Number of registered executors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Returns true if no executors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Registered executor names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }
}

impl ExecutorLookup for ExecutorRegistry {
    fn exists(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    fn get(&self, name: &str) -> Result<Arc<ExecutorProfile>> {
        self.executors
            .get(name)
            .cloned()
            .ok_or_else(|| ExecutorError::NotFound(name.to_string()))
    }
}

/// Shared, swappable reference to the current executor registry.
#[derive(Debug, Clone, Default)]
pub struct ExecutorRegistryHandle {
    current: Arc<RwLock<Arc<ExecutorRegistry>>>,
}

impl ExecutorRegistryHandle {
    /// Wraps an initial registry.
    #[must_use]
    pub fn new(registry: ExecutorRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Returns a snapshot of the current registry.
    #[must_use]
    pub fn current(&self) -> Arc<ExecutorRegistry> {
        Arc::clone(&*self.current.read())
    }

    /// Installs a new registry and returns the previous one.
    pub fn replace(&self, registry: ExecutorRegistry) -> Arc<ExecutorRegistry> {
        std::mem::replace(&mut *self.current.write(), Arc::new(registry))
    }

    /// Reloads the registry from a file. On failure the current registry is kept.
    ///
    /// # Errors
    ///
    /// Returns the loader error if the file cannot be loaded.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<()> {
        match ExecutorRegistry::load(path) {
            Ok(registry) => {
                self.replace(registry);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "executor registry reload failed, keeping current registry");
                Err(e)
            }
        }
    }
}

impl ExecutorLookup for ExecutorRegistryHandle {
    fn exists(&self, name: &str) -> bool {
        self.current.read().exists(name)
    }

    fn get(&self, name: &str) -> Result<Arc<ExecutorProfile>> {
        self.current.read().get(name)
    }
}
