//! Typed resource claims declared by a task.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single resource claim on a task configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    /// Fractional CPU cores.
    NumCpus(f64),
    /// RAM in megabytes.
    RamMb(u64),
    /// Disk in megabytes.
    DiskMb(u64),
    /// A named port to be assigned at launch.
    NamedPort(String),
    /// Whole GPUs.
    NumGpus(u64),
}

impl Resource {
    /// Returns the type of this claim.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            Self::NumCpus(_) => ResourceType::Cpus,
            Self::RamMb(_) => ResourceType::RamMb,
            Self::DiskMb(_) => ResourceType::DiskMb,
            Self::NamedPort(_) => ResourceType::Ports,
            Self::NumGpus(_) => ResourceType::Gpus,
        }
    }

    /// Returns the port name if this is a named port claim.
    #[must_use]
    pub fn named_port(&self) -> Option<&str> {
        match self {
            Self::NamedPort(name) => Some(name),
            _ => None,
        }
    }
}

/// Kinds of resources a task can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// CPU cores.
    Cpus,
    /// RAM.
    RamMb,
    /// Disk.
    DiskMb,
    /// Named ports.
    Ports,
    /// GPUs.
    Gpus,
}

impl ResourceType {
    /// All resource types.
    pub const ALL: [Self; 5] = [Self::Cpus, Self::RamMb, Self::DiskMb, Self::Ports, Self::Gpus];

    /// Name shown to job submitters.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cpus => "numCpus",
            Self::RamMb => "ramMb",
            Self::DiskMb => "diskMb",
            Self::Ports => "namedPort",
            Self::Gpus => "numGpus",
        }
    }

    /// Name used in resource offers.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Cpus => "cpus",
            Self::RamMb => "mem",
            Self::DiskMb => "disk",
            Self::Ports => "ports",
            Self::Gpus => "gpus",
        }
    }

    /// Whether a task may declare more than one claim of this type.
    #[must_use]
    pub const fn is_multiple_allowed(self) -> bool {
        matches!(self, Self::Ports)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ports_allow_multiples() {
        let multiple: Vec<_> = ResourceType::ALL
            .into_iter()
            .filter(|t| t.is_multiple_allowed())
            .collect();
        assert_eq!(multiple, vec![ResourceType::Ports]);
    }

    #[test]
    fn claim_types() {
        assert_eq!(Resource::NumCpus(1.0).resource_type(), ResourceType::Cpus);
        assert_eq!(Resource::RamMb(1).resource_type(), ResourceType::RamMb);
        assert_eq!(Resource::DiskMb(1).resource_type(), ResourceType::DiskMb);
        assert_eq!(
            Resource::NamedPort("http".into()).resource_type(),
            ResourceType::Ports
        );
        assert_eq!(Resource::NumGpus(1).resource_type(), ResourceType::Gpus);
    }

    #[test]
    fn named_port_accessor() {
        assert_eq!(Resource::NamedPort("http".into()).named_port(), Some("http"));
        assert_eq!(Resource::RamMb(64).named_port(), None);
    }

    #[test]
    fn resource_serialization() {
        let json = serde_json::to_string(&Resource::RamMb(512)).unwrap_or_default();
        assert_eq!(json, r#"{"ramMb":512}"#);
    }
}
