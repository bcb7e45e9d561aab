//! Executor profiles for the Skiff scheduler.
//!
//! An executor is the process an agent starts to run a task. Each executor has
//! a profile: how to launch it, what it fetches, what it costs per task and
//! which host paths it mounts into containers. Profiles live in an immutable
//! [`ExecutorRegistry`] loaded from JSON.
//!
//! # Example
//!
//! ```rust
//! use skiff_executor::{ExecutorLookup, ExecutorRegistry};
//!
//! let registry = ExecutorRegistry::from_json_str(
//!     r#"{"executors": {"custom": {"command": ["run.sh"]}}}"#,
//! ).expect("valid registry");
//!
//! assert!(registry.exists("custom"));
//! assert!(registry.get("missing").is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod mount;
pub mod profile;
pub mod registry;

pub use error::{ExecutorError, Result};
pub use mount::{Mount, MountMode};
pub use profile::{
    CommandInfo, ExecutorProfile, FetchResource, DEFAULT_COMMAND_BASE_PATH, THERMOS_EXECUTOR,
};
pub use registry::{ExecutorLookup, ExecutorRegistry, ExecutorRegistryHandle};
