//! Storage traits and the latest-per-group view for the update log
//!
//! This crate provides a minimal append-only log interface without imposing
//! implementation details on storage backends, plus the read-only view that
//! answers "what is the most recent record per group".

pub mod record;
pub mod store;
pub mod view;

// Re-export the essential types
pub use record::{GroupId, LogRecord, NewRecord};
pub use store::{
    LogStore, LogStoreStreaming, LogStoreWithRetention, StoreError, StoreResult,
};
pub use view::{LatestView, latest_per_group};
