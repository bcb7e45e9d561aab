//! Executor profiles and launch commands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use skiff_resources::ResourceVector;

use crate::error::{ExecutorError, Result};
use crate::mount::Mount;

/// Reserved name of the default executor. Only this executor keeps an observer root.
pub const THERMOS_EXECUTOR: &str = "thermos";

/// Base path prepended to the executor binary inside the sandbox.
pub const DEFAULT_COMMAND_BASE_PATH: &str = "./";

/// A URI the agent fetches into the sandbox before launching the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FetchResource {
    /// URI to fetch.
    pub value: String,
    /// Mark the fetched file executable.
    pub executable: bool,
    /// Extract archives after fetching.
    pub extract: bool,
    /// Allow the agent to serve the file from its cache.
    pub cache: bool,
}

impl FetchResource {
    /// Creates a fetch of `value` with all flags off.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Marks the fetched file executable.
    #[must_use]
    pub const fn with_executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }

    /// Sets whether archives are extracted.
    #[must_use]
    pub const fn with_extract(mut self, extract: bool) -> Self {
        self.extract = extract;
        self
    }

    /// Sets whether the agent cache may be used.
    #[must_use]
    pub const fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }
}

/// The command an agent runs to start an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandInfo {
    /// Program (or shell string when `shell` is set).
    pub value: String,
    /// Argument vector, including the program name.
    pub arguments: Vec<String>,
    /// URIs fetched before launch.
    pub uris: Vec<FetchResource>,
    /// Run `value` through a shell.
    pub shell: bool,
}

impl CommandInfo {
    /// Builds a direct (non-shell) command that runs `command[0]` from `base_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidCommand`] if the command is empty or the
    /// base path is blank.
    pub fn create(command: &[String], resources: &[FetchResource], base_path: &str) -> Result<Self> {
        let program = command
            .first()
            .ok_or_else(|| ExecutorError::InvalidCommand("command is empty".into()))?;
        check_base_path(base_path)?;
        Ok(Self {
            value: format!("{base_path}{program}"),
            arguments: command.to_vec(),
            uris: resources.to_vec(),
            shell: false,
        })
    }
}

fn check_base_path(base_path: &str) -> Result<()> {
    if base_path.trim().is_empty() {
        return Err(ExecutorError::InvalidCommand("base path is blank".into()));
    }
    Ok(())
}

/// Everything the scheduler needs to launch tasks with a given executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorProfile {
    /// Registry key.
    pub name: String,
    /// Launch command.
    pub command: CommandInfo,
    /// Files fetched into the sandbox.
    pub download_resources: Vec<FetchResource>,
    /// Resources the executor process itself consumes per task.
    pub overhead: ResourceVector,
    /// Mounts added to every container this executor runs in.
    pub container_mounts: Vec<Mount>,
    /// Observer checkpoint root. Empty unless this is the thermos executor.
    pub observer_root: String,
    /// Free-form executor settings.
    pub config: BTreeMap<String, String>,
}

impl ExecutorProfile {
    /// Creates a profile with no overhead, mounts or settings.
    #[must_use]
    pub fn new(name: impl Into<String>, command: CommandInfo) -> Self {
        Self {
            name: name.into(),
            download_resources: command.uris.clone(),
            command,
            overhead: ResourceVector::ZERO,
            container_mounts: Vec::new(),
            observer_root: String::new(),
            config: BTreeMap::new(),
        }
    }

    /// Sets the per-task overhead.
    #[must_use]
    pub const fn with_overhead(mut self, overhead: ResourceVector) -> Self {
        self.overhead = overhead;
        self
    }

    /// Adds a container mount.
    #[must_use]
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.container_mounts.push(mount);
        self
    }

    /// Sets the observer root. Ignored for executors other than thermos.
    #[must_use]
    pub fn with_observer_root(mut self, root: impl Into<String>) -> Self {
        if self.is_thermos() {
            self.observer_root = root.into();
        }
        self
    }

    /// Adds a setting.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Returns true for the reserved thermos executor.
    #[must_use]
    pub fn is_thermos(&self) -> bool {
        self.name == THERMOS_EXECUTOR
    }

    /// Charges this executor's overhead to a task footprint.
    #[must_use]
    pub fn apply_overhead(&self, task: &ResourceVector) -> ResourceVector {
        task.with_executor_overhead(&self.overhead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn create_prefixes_base_path() {
        let resources = vec![FetchResource::new("/usr/share/thermos.pex").with_executable(true)];
        let info = CommandInfo::create(
            &command(&["thermos.pex", "--announce"]),
            &resources,
            DEFAULT_COMMAND_BASE_PATH,
        )
        .expect("command");

        assert_eq!(info.value, "./thermos.pex");
        assert_eq!(info.arguments, command(&["thermos.pex", "--announce"]));
        assert_eq!(info.uris, resources);
        assert!(!info.shell);
    }

    #[test]
    fn create_rejects_empty_command() {
        let result = CommandInfo::create(&[], &[], DEFAULT_COMMAND_BASE_PATH);
        assert!(matches!(result, Err(ExecutorError::InvalidCommand(_))));
    }

    #[test]
    fn create_rejects_blank_base_path() {
        let result = CommandInfo::create(&command(&["x"]), &[], "  ");
        assert!(matches!(result, Err(ExecutorError::InvalidCommand(_))));
    }

    #[test]
    fn observer_root_only_kept_for_thermos() {
        let info = CommandInfo::create(&command(&["x"]), &[], "./").expect("command");
        let thermos = ExecutorProfile::new(THERMOS_EXECUTOR, info.clone())
            .with_observer_root("/var/run/thermos");
        let custom = ExecutorProfile::new("custom", info).with_observer_root("/var/run/thermos");

        assert_eq!(thermos.observer_root, "/var/run/thermos");
        assert!(custom.observer_root.is_empty());
    }

    #[test]
    fn apply_overhead_uses_floor() {
        let info = CommandInfo::create(&command(&["x"]), &[], "./").expect("command");
        let profile = ExecutorProfile::new("custom", info)
            .with_overhead(ResourceVector::from_megabytes(0.25, 128, 0, 0));
        let charged = profile.apply_overhead(&ResourceVector::from_megabytes(1.0, 1024, 0, 0));
        assert_eq!(charged, ResourceVector::from_megabytes(1.25, 1152, 1, 0));
    }
}
