//! Latest-record-per-group view over the update log
//!
//! The view is a pure read-side derivation: it owns no storage and is
//! recomputed from the log on every query. For each group present in the
//! log it selects the record with the maximum `created_at`, breaking ties
//! by the maximum `id` (last-inserted wins under monotonic id assignment).

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use crate::record::{GroupId, LogRecord};
use crate::store::{LogStore, StoreResult};

/// Reduce a set of log records to the latest record per group
///
/// Selection maximizes `(created_at, id)` within each group. The result is
/// ordered by `created_at` descending, with id descending as a secondary
/// order so equal-timestamp output is deterministic.
///
/// Empty input yields an empty result. The reduction is pure: repeated
/// calls over the same records return identical output.
pub fn latest_per_group<I>(records: I) -> Vec<LogRecord>
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut latest: HashMap<GroupId, LogRecord> = HashMap::new();

    for record in records {
        match latest.entry(record.group.clone()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get();
                if (record.created_at, record.id) > (current.created_at, current.id) {
                    entry.insert(record);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }

    let mut result: Vec<LogRecord> = latest.into_values().collect();
    result.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    result
}

/// Read-only latest-per-group view bound to a log store
///
/// The view performs no retries and keeps no state: every query scans the
/// store and reduces the result. Store failures propagate to the caller
/// unchanged. Any number of views may read the same store concurrently.
#[derive(Clone)]
pub struct LatestView<S> {
    store: Arc<S>,
}

impl<S> LatestView<S>
where
    S: LogStore,
{
    /// Create a view over the given store
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create a view from an already Arc-wrapped store
    pub fn from_arc(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The latest record of every group present in the log
    ///
    /// Returns exactly one record per distinct group, ordered by
    /// `created_at` descending (most recent group activity first).
    pub async fn query(&self) -> StoreResult<Vec<LogRecord>> {
        let records = self.store.scan().await?;
        debug!("LatestView: reducing {} records", records.len());
        Ok(latest_per_group(records))
    }

    /// The latest record of a single group, or `None` if the group has no
    /// records
    pub async fn latest_for_group(&self, group: &GroupId) -> StoreResult<Option<LogRecord>> {
        let records = self.store.scan_group(group).await?;
        debug!(
            "LatestView: reducing {} records for group {}",
            records.len(),
            group
        );
        Ok(latest_per_group(records).into_iter().next())
    }
}

impl<S: LogStore> std::fmt::Debug for LatestView<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestView")
            .field("store_type", &std::any::type_name::<S>())
            .finish()
    }
}
