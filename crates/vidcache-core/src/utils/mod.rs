//! Utility functions for string formatting.

pub mod format;

pub use format::{format_count, format_rating, truncate_string};
