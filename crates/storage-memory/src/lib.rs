//! In-memory update log store implementation

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_stream::Stream;
use tracing::debug;
use updatelog_storage::{
    GroupId, LogRecord, LogStore, LogStoreStreaming, LogStoreWithRetention, NewRecord,
    StoreResult,
};

/// In-memory log store using a BTreeMap keyed by record id
///
/// Ids start at 1 and only move forward; pruning never causes reuse. The
/// handle is cheap to clone and all clones share the same log.
#[derive(Clone)]
pub struct MemoryStore {
    /// Records keyed by id, so scans come out in id order
    records: Arc<RwLock<BTreeMap<u64, LogRecord>>>,
    /// Per-group id index: group -> ascending ids
    groups: Arc<RwLock<HashMap<GroupId, Vec<u64>>>>,
    /// Next id to assign; only advanced while the records write lock is held
    next_id: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            groups: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, records: Vec<NewRecord>) -> StoreResult<Vec<LogRecord>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut map = self.records.write().await;
        let mut groups = self.groups.write().await;

        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            // The write lock is held, so the batch gets contiguous ids
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let record = LogRecord {
                id,
                group: record.group,
                created_at: record.created_at,
                payload: record.payload,
            };

            groups.entry(record.group.clone()).or_default().push(id);
            map.insert(id, record.clone());
            stored.push(record);
        }

        Ok(stored)
    }

    async fn scan(&self) -> StoreResult<Vec<LogRecord>> {
        let map = self.records.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn scan_group(&self, group: &GroupId) -> StoreResult<Vec<LogRecord>> {
        let map = self.records.read().await;
        let groups = self.groups.read().await;

        if let Some(ids) = groups.get(group) {
            Ok(ids.iter().filter_map(|id| map.get(id)).cloned().collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn count(&self) -> StoreResult<u64> {
        let map = self.records.read().await;
        Ok(map.len() as u64)
    }

    async fn bounds(&self) -> StoreResult<Option<(u64, u64)>> {
        let map = self.records.read().await;
        let first = map.keys().next().copied();
        let last = map.keys().next_back().copied();
        Ok(first.zip(last))
    }
}

#[async_trait]
impl LogStoreStreaming for MemoryStore {
    async fn scan_stream(
        &self,
    ) -> StoreResult<Box<dyn Stream<Item = StoreResult<LogRecord>> + Send + Unpin>> {
        // Snapshot under the read lock, then stream without holding it
        let snapshot: Vec<LogRecord> = self.records.read().await.values().cloned().collect();
        Ok(Box::new(futures::stream::iter(
            snapshot.into_iter().map(Ok),
        )))
    }
}

#[async_trait]
impl LogStoreWithRetention for MemoryStore {
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut map = self.records.write().await;
        let mut groups = self.groups.write().await;

        let doomed: Vec<u64> = map
            .values()
            .filter(|record| record.created_at < cutoff)
            .map(|record| record.id)
            .collect();

        for id in &doomed {
            if let Some(record) = map.remove(id)
                && let Some(ids) = groups.get_mut(&record.group)
            {
                ids.retain(|kept| kept != id);
                if ids.is_empty() {
                    groups.remove(&record.group);
                }
            }
        }

        debug!("MemoryStore: pruned {} records before {}", doomed.len(), cutoff);
        Ok(doomed.len() as u64)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &"<locked>")
            .field("groups", &"<locked>")
            .finish()
    }
}
