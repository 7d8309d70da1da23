//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager`, which keeps the last-known
//! video list in a single named slot of a `KeyValueStore`. The slot is
//! rewritten in full on every successful change to the list.
//!
//! Stores:
//! - `FileStore`: one JSON file per slot under the cache directory
//! - `MemoryStore`: shared in-memory slots, for tests and previews

pub mod manager;
pub mod store;

pub use manager::{CacheManager, CachedData, VIDEOS_SLOT};
pub use store::{FileStore, KeyValueStore, MemoryStore};
