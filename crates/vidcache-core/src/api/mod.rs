//! REST API client module for the video catalog backend.
//!
//! This module provides the `ApiClient` for talking to the catalog's
//! collection endpoint, the `VideoService` seam the collection state
//! owner depends on, and `ApiError` with its user-facing messages.

pub mod client;
pub mod error;
pub mod service;

pub use client::{ApiClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{ApiError, Operation};
pub use service::VideoService;
