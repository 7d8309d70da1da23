//! Data models for the video catalog.
//!
//! - `Video`: a catalog entry as stored remotely and in the cache
//! - `NewVideo`: create request body (a video without its id)
//! - `VideoDraft`: text state of the create/edit form

pub mod video;

pub use video::{NewVideo, Video, VideoDraft, MAX_STARS};
