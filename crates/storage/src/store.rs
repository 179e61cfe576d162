//! Append-only log store abstraction
//!
//! This module provides the storage interface the update log is written to
//! and read from. The core [`LogStore`] trait is deliberately append-only:
//! records are never updated in place, and anything holding a `LogStore`
//! cannot remove entries. Retention lives on the separate
//! [`LogStoreWithRetention`] trait so read paths keep an immutable view of
//! history.
//!
//! Key features:
//! - Small API: append a batch, scan everything, scan one group
//! - Store-assigned ids, contiguous within a batch and never reused
//! - Optional streaming scans for large logs
//! - Retention as an explicit, separate capability

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_stream::Stream;

use crate::record::{GroupId, LogRecord, NewRecord};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage backend error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation not supported
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Append-only log store trait
///
/// Implementations assign each appended record a unique, monotonically
/// increasing id. Scans return records in ascending id order.
#[async_trait]
pub trait LogStore: Clone + Send + Sync + 'static {
    /// Atomically append records, returning them with their assigned ids
    ///
    /// Ids assigned within one call are contiguous and follow the order of
    /// the input batch.
    async fn append(&self, records: Vec<NewRecord>) -> StoreResult<Vec<LogRecord>>;

    /// Read every record in the log, in ascending id order
    async fn scan(&self) -> StoreResult<Vec<LogRecord>>;

    /// Read every record belonging to one group, in ascending id order
    async fn scan_group(&self, group: &GroupId) -> StoreResult<Vec<LogRecord>>;

    /// Number of records currently in the log
    async fn count(&self) -> StoreResult<u64>;

    /// The current id bounds of the log (first_id, last_id)
    async fn bounds(&self) -> StoreResult<Option<(u64, u64)>>;
}

/// Log store trait that supports streaming scans
///
/// This trait is optional and allows storage backends to provide scans that
/// do not materialize the whole log at once.
#[async_trait]
pub trait LogStoreStreaming: LogStore {
    /// Stream every record in the log, in ascending id order
    ///
    /// The stream may yield errors inline. Implementations should use
    /// backend-specific iterators where available and handle concurrent
    /// appends gracefully (a stream observes some consistent snapshot).
    async fn scan_stream(
        &self,
    ) -> StoreResult<Box<dyn Stream<Item = StoreResult<LogRecord>> + Send + Unpin>>;
}

/// Log store trait that supports retention
///
/// This trait is separate from [`LogStore`] so the log stays append-only for
/// readers while still letting an owning writer expire old history.
#[async_trait]
pub trait LogStoreWithRetention: LogStore {
    /// Remove all records with `created_at` strictly before the cutoff
    ///
    /// Returns the number of records removed. Ids of removed records are
    /// never reassigned.
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// Implement LogStore for Arc<T> where T: LogStore
#[async_trait]
impl<T: LogStore> LogStore for std::sync::Arc<T> {
    async fn append(&self, records: Vec<NewRecord>) -> StoreResult<Vec<LogRecord>> {
        (**self).append(records).await
    }

    async fn scan(&self) -> StoreResult<Vec<LogRecord>> {
        (**self).scan().await
    }

    async fn scan_group(&self, group: &GroupId) -> StoreResult<Vec<LogRecord>> {
        (**self).scan_group(group).await
    }

    async fn count(&self) -> StoreResult<u64> {
        (**self).count().await
    }

    async fn bounds(&self) -> StoreResult<Option<(u64, u64)>> {
        (**self).bounds().await
    }
}

/// Implement LogStoreStreaming for Arc<T> where T: LogStoreStreaming
#[async_trait]
impl<T: LogStoreStreaming> LogStoreStreaming for std::sync::Arc<T> {
    async fn scan_stream(
        &self,
    ) -> StoreResult<Box<dyn Stream<Item = StoreResult<LogRecord>> + Send + Unpin>> {
        (**self).scan_stream().await
    }
}

/// Implement LogStoreWithRetention for Arc<T> where T: LogStoreWithRetention
#[async_trait]
impl<T: LogStoreWithRetention> LogStoreWithRetention for std::sync::Arc<T> {
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        (**self).prune_before(cutoff).await
    }
}
