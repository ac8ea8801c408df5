//! In-process, byte-budgeted LRU cache with cache-aside groups.
//!
//! - [`LruCache`]: single-threaded LRU bounded by key + value bytes
//! - [`ConcurrentCache`]: mutex-guarded, lazily allocated wrapper
//! - [`Group`]: named cache that falls back to a [`Loader`] on a miss
//! - [`Registry`]: directory of groups, shared with the transport
//! - [`HttpPool`]: maps `/<base>/<group>/<key>` requests onto groups
//!
//! # Quick Start
//!
//! ```
//! use geecache_core::{MapLoader, Registry};
//!
//! let registry = Registry::new();
//! let scores = registry.create_group(
//!     "scores",
//!     2 << 10,
//!     MapLoader::new().with_entry("Tom", "630"),
//! );
//!
//! let view = scores.get("Tom").unwrap();
//! assert_eq!(view.to_string(), "630");
//! assert!(registry.get_group("scores").is_some());
//! ```
//!
//! # Concurrency
//!
//! Loaders are called with no cache lock held, so a slow load never blocks
//! lookups of other keys. Concurrent misses for the same key are not
//! coalesced: each one calls the loader.

pub mod byteview;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod http;
pub mod loader;
pub mod lru;
pub mod registry;

pub use byteview::ByteView;
pub use cache::{CacheStats, ConcurrentCache};
pub use config::{GroupConfig, NodeConfig, SourceConfig};
pub use error::{CacheError, CacheResult};
pub use group::{Group, GroupStats};
pub use http::{HttpPool, PoolResponse, CONTENT_TYPE_OCTET_STREAM, DEFAULT_BASE_PATH};
pub use loader::{DirLoader, Loader, MapLoader};
pub use lru::{EvictionCallback, LruCache, Value};
pub use registry::{GroupBuilder, Registry};
