//! Store Module
//!
//! Content-addressed, directory-sharded persistence for raw record blobs.
//!
//! ## Responsibilities
//! - Derive a fixed-length identifier from a record name
//! - Spread identifiers over a nested directory tree
//! - Keep recently used blobs in a byte-budgeted cache
//! - Put/get/delete/enumerate with the filesystem as the only authority
//!
//! ## On-Disk Layout (shard width 2)
//! ```text
//! {root}/
//!   └── 3f/
//!       └── a2/
//!           └── ... (16 levels for a 32-char identifier)
//!               └── 3fa2...c9        <- file named by the full identifier
//! ```
//!
//! There is no index file: the tree itself is the index.

mod key;
mod shard;
mod cache;
mod record_store;

pub use key::{KeyDeriver, IDENTIFIER_LEN};
pub use shard::PathSharder;
pub use cache::BoundedCache;
pub use record_store::{CacheStats, Entries, RecordStore};
