//! In-memory transactional storage for the Skiff scheduler.
//!
//! [`Storage`] keeps scheduled tasks and per-role quotas. Read work sees a
//! consistent snapshot; write work runs in a transaction that commits only on
//! success. Nested writes join the enclosing transaction, and a failure at any
//! level discards the whole thing.
//!
//! # Example
//!
//! ```rust
//! use skiff_resources::ResourceVector;
//! use skiff_storage::{QuotaStore, Storage, StorageError};
//!
//! let storage = Storage::new();
//! storage.write(|store| {
//!     store.save_quota("www-data", ResourceVector::from_megabytes(2.0, 512, 100, 0))
//! })?;
//!
//! let quota = storage.read(|store| store.fetch_quota("www-data"));
//! assert_eq!(quota.map(|q| q.cpus()), Some(2.0));
//! # Ok::<(), StorageError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod query;
mod storage;
mod store;

pub use error::{Result, StorageError};
pub use query::TaskQuery;
pub use storage::Storage;
pub use store::{MutableStoreProvider, QuotaStore, StoreProvider, TaskStore};
