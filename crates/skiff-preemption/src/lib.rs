//! Preemption for the Skiff scheduler.
//!
//! When a pending task cannot be placed, running tasks become
//! [`PreemptionCandidate`]s. [`rank_victims`] orders them by how readily they
//! should be evicted, and [`VictimFilter`] picks the smallest prefix of that
//! order on one host that frees enough room.
//!
//! # Example
//!
//! ```rust
//! use skiff_preemption::{rank_victims, PreemptionCandidate};
//! use skiff_resources::ResourceVector;
//!
//! let footprint = ResourceVector::from_megabytes(1.0, 128, 0, 0);
//! let t1 = PreemptionCandidate::new("t1", "host", "role", footprint).with_priority(10);
//! let t2 = PreemptionCandidate::new("t2", "host", "role", footprint)
//!     .with_priority(10)
//!     .with_production(true);
//!
//! let ranked = rank_victims(vec![t2, t1]);
//! assert_eq!(ranked[0].task_id, "t1");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod candidate;
pub mod filter;
pub mod ranking;

pub use candidate::{PendingTask, PreemptionCandidate};
pub use filter::{VictimFilter, VictimSet};
pub use ranking::{rank_victims, victim_order};
