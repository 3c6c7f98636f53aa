//! Query layer
//!
//! Cached, deduplicated reads with retry, and mutations that invalidate
//! the reads they affect.

pub mod cache;
pub mod hooks;
pub mod keys;

pub use cache::{QueryCache, RetryPolicy};
pub use hooks::Queries;
pub use keys::{QueryKey, Resource};
