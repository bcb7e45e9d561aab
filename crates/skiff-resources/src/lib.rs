//! Resource accounting for the Skiff scheduler.
//!
//! [`ResourceVector`] is the quantity everything else is measured in: task
//! footprints, executor overhead, host slack and role quotas.
//!
//! # Example
//!
//! ```rust
//! use skiff_resources::ResourceVector;
//!
//! let task = ResourceVector::from_megabytes(0.001, 1, 0, 0);
//! let charged = task.with_executor_overhead(&ResourceVector::ZERO);
//! assert_eq!(charged, ResourceVector::MIN_EXECUTOR_FLOOR);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod vector;
pub mod wire;

pub use error::{ResourceError, Result};
pub use vector::{ResourceVector, MIB};
pub use wire::{to_ranges, PortRange, WireResource, WireValue};
