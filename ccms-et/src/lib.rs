//! # CCMS Editing Tools client
//!
//! Consumer-side library for editing surfaces talking to the content engine
//! (ccms-ce). Provides:
//! - a typed HTTP client for the engine's API
//! - bounded retry with exponential backoff on transient read failures
//! - a per-parent children cache with in-flight request deduplication and
//!   optimistic-update-then-refetch reconciliation
//!
//! Nothing here is authoritative; the engine's derived totals always win.

pub mod cache;
pub mod client;
pub mod error;
pub mod retry;

pub use cache::{ChildrenCache, EditorCache};
pub use client::ContentClient;
pub use error::ClientError;
pub use retry::{retry_with_backoff, RetryPolicy};
