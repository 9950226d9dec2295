//! # pyidx-core
//!
//! The data layer behind publishing packages to a bucket-hosted simple index.
//!
//! A [`Package`] names the files to publish; an [`Index`] is the listing
//! page for one package directory, parsed from the stored HTML, merged with
//! the package's files and rendered back. Nothing in this crate performs I/O
//! or logs: fetching and storing bytes belongs to the storage layer.
//!
//! ```
//! use pyidx_core::{Index, Package};
//!
//! let mut index = Index::parse("");
//! index
//!     .add_package(&Package::new("foo", ["dist/foo-1.0.tar.gz"]))
//!     .unwrap();
//! let html = index.to_html();
//! assert_eq!(Index::parse(&html), index);
//! ```

pub mod digest;
pub mod filename;
pub mod html;
pub mod index;
pub mod normalize;
pub mod package;

pub use digest::sha256_hex;
pub use filename::{has_dist_extension, release_key, DistFilename, DistKind};
pub use index::{Index, IndexError, Link};
pub use normalize::normalize_name;
pub use package::{Artifact, Package};
