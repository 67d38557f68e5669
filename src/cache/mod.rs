//! Cache Module
//!
//! Provides the in-process cache engine with LRU eviction and TTL expiry.
//!
//! # Layout
//! - `router`: keyed hash from key to bucket
//! - `bucket`: per-bucket record chains
//! - `lru`: global recency ordering
//! - `record`: records and the arena that owns them
//! - `store`: the engine tying them together behind one lock

mod bucket;
mod lru;
mod record;
mod router;
mod store;


// Re-export public types
pub use store::Cache;
