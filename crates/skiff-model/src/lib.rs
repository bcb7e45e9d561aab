//! Task and job configuration model for the Skiff scheduler.
//!
//! These are plain data types shared by admission, resource accounting,
//! preemption and storage. They perform no validation of their own beyond
//! what the type system expresses; see `skiff-admission` for the pipeline
//! that turns a submitted configuration into a canonical one.
//!
//! # Example
//!
//! ```rust
//! use skiff_model::{ExecutorConfig, JobKey, Resource, TaskConfig};
//!
//! let task = TaskConfig::new(JobKey::new("www-data", "prod", "hello"))
//!     .with_resource(Resource::NumCpus(0.5))
//!     .with_resource(Resource::RamMb(256))
//!     .with_resource(Resource::DiskMb(128))
//!     .with_executor(ExecutorConfig::new("thermos", "{}"));
//!
//! assert_eq!(task.executor_name(), Some("thermos"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod identifier;
mod job;
mod resource;
mod status;
mod task;

pub use identifier::{is_good_identifier, MAX_IDENTIFIER_LENGTH};
pub use job::{Identity, JobConfiguration, JobKey};
pub use resource::{Resource, ResourceType};
pub use status::{AssignedTask, ScheduleStatus, ScheduledTask};
pub use task::{
    Constraint, Container, ContainerType, DockerContainer, DockerParameter, ExecutorConfig,
    FetcherUri, LimitConstraint, Metadata, TaskConfig, TaskConstraint, ValueConstraint,
    DEDICATED_ATTRIBUTE,
};
