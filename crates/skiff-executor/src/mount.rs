//! Container mounts added to every task an executor launches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ExecutorError, Result};

/// Access mode of a mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountMode {
    /// Read-only.
    Ro,
    /// Read-write.
    #[default]
    Rw,
}

impl MountMode {
    /// Returns the Docker-style mode suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ro => "ro",
            Self::Rw => "rw",
        }
    }
}

/// A host path mounted into the task container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mount {
    /// Path on the host.
    pub host_path: String,
    /// Path inside the container.
    pub container_path: String,
    /// Access mode.
    pub mode: MountMode,
}

impl Mount {
    /// Creates a new mount.
    #[must_use]
    pub fn new(
        host_path: impl Into<String>,
        container_path: impl Into<String>,
        mode: MountMode,
    ) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode,
        }
    }

    /// Parses a Docker-style `host:container[:ro|rw]` string.
    ///
    /// The mode defaults to read-write.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidMount`] if the string does not have two
    /// or three parts, a path is empty, or the mode is unknown.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || ExecutorError::InvalidMount(raw.to_string());
        let parts: Vec<&str> = raw.split(':').collect();
        let (host, container, mode) = match parts.as_slice() {
            [host, container] => (*host, *container, MountMode::Rw),
            [host, container, "ro"] => (*host, *container, MountMode::Ro),
            [host, container, "rw"] => (*host, *container, MountMode::Rw),
            _ => return Err(invalid()),
        };
        if host.is_empty() || container.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(host, container, mode))
    }
}

impl FromStr for Mount {
    type Err = ExecutorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.host_path,
            self.container_path,
            self.mode.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/etc/skiff:/etc/skiff", MountMode::Rw ; "default mode")]
    #[test_case("/etc/skiff:/etc/skiff:ro", MountMode::Ro ; "read only")]
    #[test_case("/etc/skiff:/etc/skiff:rw", MountMode::Rw ; "read write")]
    fn parses_valid_mounts(raw: &str, mode: MountMode) {
        let mount = Mount::parse(raw);
        assert_eq!(
            mount.ok(),
            Some(Mount::new("/etc/skiff", "/etc/skiff", mode))
        );
    }

    #[test_case("/only-one-part" ; "one part")]
    #[test_case("/a:/b:ro:extra" ; "four parts")]
    #[test_case("/a:/b:rx" ; "bad mode")]
    #[test_case(":/b" ; "empty host")]
    #[test_case("/a:" ; "empty container")]
    fn rejects_invalid_mounts(raw: &str) {
        assert!(matches!(
            Mount::parse(raw),
            Err(ExecutorError::InvalidMount(s)) if s == raw
        ));
    }

    #[test]
    fn display_round_trips() {
        let mount = Mount::new("/host", "/container", MountMode::Ro);
        let parsed: Result<Mount> = mount.to_string().parse();
        assert_eq!(parsed.ok(), Some(mount));
    }
}
