//! # pyidx
//!
//! Publish Python distributions to an object storage bucket laid out as a
//! simple package index, one HTML listing per project plus an optional root
//! listing of every project.
//!
//! ```no_run
//! use pyidx::{group_distributions, Publisher, PublishOptions, Storage, StorageOptions};
//! use pyidx_store::LocalStore;
//!
//! # fn main() -> Result<(), pyidx::PublishError> {
//! let storage = Storage::new(
//!     LocalStore::new("bucket"),
//!     StorageOptions {
//!         prefix: Some("simple".to_string()),
//!         acl: "public-read".to_string(),
//!         static_website: false,
//!     },
//! );
//! let publisher = Publisher::new(storage, PublishOptions::default());
//! for package in group_distributions(&["dist/foo-1.0.tar.gz"])? {
//!     let report = publisher.publish(&package)?;
//!     println!("{} -> {}", report.package, report.index_key);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dist;
pub mod error;
pub mod publish;
pub mod storage;

pub use config::{Config, StoreConfig};
pub use dist::{expand_inputs, group_distributions};
pub use error::{ConfigError, PublishError, PublishResult};
pub use publish::{PublishOptions, PublishReport, Publisher};
pub use storage::{Storage, StorageOptions};
