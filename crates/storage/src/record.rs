//! Record model for the update log
//!
//! Records are immutable once appended. The store assigns ids; writers only
//! provide the group, timestamp, and payload.

use std::fmt::Display;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logical partition key under which log records accumulate
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    /// Create a new group id
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the group id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for GroupId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A single entry in the update log
///
/// Ids are unique, assigned at insertion, and never reused. `created_at` is
/// supplied by the writer and is not guaranteed monotonic within a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Store-assigned identifier, monotonically increasing
    pub id: u64,

    /// The group this record belongs to
    pub group: GroupId,

    /// Writer-supplied creation timestamp
    pub created_at: DateTime<Utc>,

    /// Opaque record data
    pub payload: Bytes,
}

/// A record as submitted by a writer, before the store assigns an id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// The group the record belongs to
    pub group: GroupId,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Opaque record data
    pub payload: Bytes,
}

impl NewRecord {
    /// Create a new record for the given group
    pub fn new(group: impl Into<GroupId>, created_at: DateTime<Utc>, payload: impl Into<Bytes>) -> Self {
        Self {
            group: group.into(),
            created_at,
            payload: payload.into(),
        }
    }
}
