//! Core library for vidcache.
//!
//! Keeps a video catalog in sync between a REST backend and a local cache:
//!
//! - `api`: HTTP client, error classification and the `VideoService` seam
//! - `cache`: key-value stores and the cached video slot
//! - `reconcile`: merge of remote and cached lists by id
//! - `inflight`: per-id guard against overlapping mutations
//! - `collection`: the state owner driving load/add/update/delete
//! - `config`: persisted settings and environment overrides

pub mod api;
pub mod cache;
pub mod collection;
pub mod config;
pub mod inflight;
pub mod models;
pub mod reconcile;
pub mod utils;

pub use api::{ApiClient, ApiError, Operation, VideoService};
pub use cache::{CacheManager, FileStore, KeyValueStore, MemoryStore};
pub use collection::{Mutation, MutationOutcome, VideoCollection, ViewState};
pub use config::Config;
pub use inflight::{Busy, InFlightTracker};
pub use models::{NewVideo, Video, VideoDraft};
pub use reconcile::{reconcile, reconcile_detailed, Reconciliation};
