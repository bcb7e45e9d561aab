//! Admission for the Skiff scheduler.
//!
//! Every submitted job passes through [`ConfigValidator`] before it is stored.
//! The validator checks a task against the cluster's [`ClusterPolicy`], resolves
//! its tier and executor, reconciles legacy resource fields with typed claims
//! and fills in defaults. The result is a canonical [`skiff_model::TaskConfig`]
//! or a [`TaskDescriptionError`] carrying a reason for the submitter.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use skiff_admission::{ClusterPolicy, ConfigValidator, TierInfo, TierRegistry};
//! use skiff_executor::ExecutorRegistry;
//! use skiff_model::{ExecutorConfig, JobKey, Resource, TaskConfig};
//!
//! let tiers = TierRegistry::new(
//!     "preemptible",
//!     BTreeMap::from([("preemptible".to_string(), TierInfo::new(true, false))]),
//! )?;
//! let executors = ExecutorRegistry::from_json_str(
//!     r#"{"executors": {"custom": {"command": ["run.sh"]}}}"#,
//! )?;
//! let validator = ConfigValidator::new(
//!     ClusterPolicy::default(),
//!     Arc::new(tiers),
//!     Arc::new(executors),
//! );
//!
//! let task = TaskConfig::new(JobKey::new("www-data", "prod", "hello"))
//!     .with_resource(Resource::NumCpus(0.5))
//!     .with_resource(Resource::RamMb(256))
//!     .with_resource(Resource::DiskMb(128))
//!     .with_executor(ExecutorConfig::new("custom", "{}"));
//!
//! let canonical = validator.validate_task(&task)?;
//! assert_eq!(canonical.num_cpus, Some(0.5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backfill;
pub mod error;
pub mod policy;
pub mod tier;
pub mod validator;

pub use backfill::{Backfill, LegacyResourceBackfill};
pub use error::{LookupError, Result, TaskDescriptionError, TierError};
pub use policy::ClusterPolicy;
pub use tier::{TierInfo, TierLookup, TierRegistry};
pub use validator::{
    ConfigValidator, EXECUTOR_REQUIRED_WITH_DOCKER, FETCHER_DISABLED, GPU_DISABLED,
    INVALID_EXECUTOR_CONFIG, NO_DOCKER_PARAMETERS, NO_EXECUTOR_OR_CONTAINER,
};
