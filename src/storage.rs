use anyhow::Result;
use async_trait::async_trait;

use crate::types::{HistoryEntry, RecentSearch};

/// Read-only view of the reading history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Entries whose title contains `filter` (all entries for an empty filter), newest first.
    async fn filter_history(&self, filter: &str) -> Result<Vec<HistoryEntry>>;

    /// The entry at position `age` (0 = newest) among entries read for at least `min_time_spent_secs`.
    async fn find_entry_for_read_more(&self, age: usize, min_time_spent_secs: i64) -> Result<Option<HistoryEntry>>;
}

/// Read-only view of recently searched terms.
#[async_trait]
pub trait RecentSearchStore: Send + Sync {
    /// Recent searches, newest first.
    async fn recent_searches(&self) -> Result<Vec<RecentSearch>>;
}
