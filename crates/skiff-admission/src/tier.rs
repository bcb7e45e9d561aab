//! Tier registry.
//!
//! Tiers are named scheduling classes. A task either names its tier or gets the
//! configured default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use skiff_model::TaskConfig;
use tracing::info;

use crate::error::TierError;

/// Scheduling properties of a tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TierInfo {
    /// Tasks in this tier may be preempted.
    pub preemptible: bool,
    /// Tasks in this tier run on revocable resources.
    pub revocable: bool,
}

impl TierInfo {
    /// Creates tier properties.
    #[must_use]
    pub const fn new(preemptible: bool, revocable: bool) -> Self {
        Self {
            preemptible,
            revocable,
        }
    }
}

/// Resolves the tier of a task.
pub trait TierLookup: Send + Sync {
    /// Returns the tier the task runs in.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Unknown`] if the task names an unconfigured tier.
    fn get_tier(&self, task: &TaskConfig) -> Result<TierInfo, TierError>;
}

/// Immutable set of configured tiers with a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TierConfig", into = "TierConfig")]
pub struct TierRegistry {
    default_tier: String,
    tiers: BTreeMap<String, TierInfo>,
}

#[derive(Clone, Serialize, Deserialize)]
struct TierConfig {
    default: String,
    tiers: BTreeMap<String, TierInfo>,
}

impl TryFrom<TierConfig> for TierRegistry {
    type Error = TierError;

    fn try_from(config: TierConfig) -> Result<Self, TierError> {
        Self::new(config.default, config.tiers)
    }
}

impl From<TierRegistry> for TierConfig {
    fn from(registry: TierRegistry) -> Self {
        Self {
            default: registry.default_tier,
            tiers: registry.tiers,
        }
    }
}

impl TierRegistry {
    /// Creates a registry.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::MissingDefault`] if `default_tier` is not in `tiers`.
    pub fn new(
        default_tier: impl Into<String>,
        tiers: BTreeMap<String, TierInfo>,
    ) -> Result<Self, TierError> {
        let default_tier = default_tier.into();
        if !tiers.contains_key(&default_tier) {
            return Err(TierError::MissingDefault(default_tier));
        }
        Ok(Self {
            default_tier,
            tiers,
        })
    }

    /// Parses `{"default": "...", "tiers": {"name": {...}}}`.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Parse`] for malformed JSON, including a missing default.
    pub fn from_json_str(json: &str) -> Result<Self, TierError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads the registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Io`] if the file cannot be read, otherwise as
    /// [`TierRegistry::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TierError> {
        let path = path.as_ref();
        let registry = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            count = registry.tiers.len(),
            default = %registry.default_tier,
            "loaded tier registry"
        );
        Ok(registry)
    }

    /// Name of the default tier.
    #[must_use]
    pub fn default_tier(&self) -> &str {
        &self.default_tier
    }

    /// Looks up a tier by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TierInfo> {
        self.tiers.get(name).copied()
    }

    /// All configured tiers.
    #[must_use]
    pub const fn tiers(&self) -> &BTreeMap<String, TierInfo> {
        &self.tiers
    }
}

impl TierLookup for TierRegistry {
    fn get_tier(&self, task: &TaskConfig) -> Result<TierInfo, TierError> {
        let name = task.tier.as_deref().unwrap_or(&self.default_tier);
        self.get(name)
            .ok_or_else(|| TierError::Unknown(name.to_string()))
    }
}
