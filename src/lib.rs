//! LRU/TTL Cache - A fixed-capacity concurrent in-process cache
//!
//! Combines least-recently-used capacity eviction with per-entry
//! time-to-live expiry behind a single lock.
//!
//! ```ignore
//! let cache = Cache::new(1000)?;
//! cache.set("session:42", user, Duration::from_secs(30)).await;
//! if let Some(user) = cache.get("session:42").await {
//!     // ...
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::Cache;
pub use config::Config;
pub use error::{CacheError, Result};
