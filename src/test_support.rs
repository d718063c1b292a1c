//! In-memory collaborators for unit tests.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::ContentService;
use crate::error::{Result, SourceError};
use crate::locale::WikiSite;
use crate::storage::{HistoryStore, RecentSearchStore};
use crate::types::{ContentItem, Coordinate, FeedContent, HistoryEntry, LabelledEntity, RecentSearch, VariantTitles};

#[derive(Default)]
pub(crate) struct MockService {
    pub feed: FeedContent,
    pub more_like: Vec<ContentItem>,
    pub nearby: Vec<ContentItem>,
    pub randoms: Mutex<VecDeque<ContentItem>>,
    pub entities: Vec<LabelledEntity>,
    pub variants: Vec<VariantTitles>,
    /// Endpoint names that answer with a 503.
    pub failing: Vec<&'static str>,
    pub call_log: Mutex<Vec<String>>,
}

impl MockService {
    pub fn with_randoms(items: Vec<ContentItem>) -> Self {
        Self { randoms: Mutex::new(items.into()), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<String> { self.call_log.lock().unwrap().clone() }

    fn record(&self, endpoint: &'static str, detail: String) -> Result<()> {
        self.call_log.lock().unwrap().push(format!("{endpoint}:{detail}"));
        if self.failing.contains(&endpoint) {
            return Err(SourceError::Status { endpoint: endpoint.to_string(), status: 503 });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentService for MockService {
    async fn featured_feed(&self, _site: &WikiSite, date: NaiveDate) -> Result<FeedContent> {
        self.record("featured_feed", date.to_string())?;
        Ok(self.feed.clone())
    }

    async fn search_more_like(&self, _site: &WikiSite, term: &str, limit: u32) -> Result<Vec<ContentItem>> {
        self.record("search_more_like", format!("{term}/{limit}"))?;
        Ok(self.more_like.clone())
    }

    async fn geo_search(&self, _site: &WikiSite, coord: Coordinate, radius_m: u32, limit: u32) -> Result<Vec<ContentItem>> {
        self.record("geo_search", format!("{}/{radius_m}/{limit}", coord.to_query()))?;
        Ok(self.nearby.clone())
    }

    async fn random_summary(&self, _site: &WikiSite) -> Result<ContentItem> {
        self.record("random_summary", String::new())?;
        self.randoms
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SourceError::Status { endpoint: "random_summary".into(), status: 404 })
    }

    async fn wikidata_descriptions(&self, titles: &str, site_db: &str, lang: &str) -> Result<Vec<LabelledEntity>> {
        self.record("wikidata_descriptions", format!("{titles}@{site_db}/{lang}"))?;
        Ok(self.entities.clone())
    }

    async fn variant_titles(&self, _site: &WikiSite, titles: &str) -> Result<Vec<VariantTitles>> {
        self.record("variant_titles", titles.to_string())?;
        Ok(self.variants.clone())
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    pub history: Vec<HistoryEntry>,
    pub searches: Vec<RecentSearch>,
    pub broken: bool,
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn filter_history(&self, filter: &str) -> anyhow::Result<Vec<HistoryEntry>> {
        if self.broken { return Err(anyhow!("history store offline")); }
        let mut out: Vec<_> = self.history.iter().filter(|h| h.title.contains(filter)).cloned().collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn find_entry_for_read_more(&self, age: usize, min_time_spent_secs: i64) -> anyhow::Result<Option<HistoryEntry>> {
        let mut engaged: Vec<_> = self.history.iter().filter(|h| h.time_spent_secs >= min_time_spent_secs).cloned().collect();
        engaged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        engaged.truncate(age.saturating_add(1));
        Ok(engaged.pop())
    }
}

#[async_trait]
impl RecentSearchStore for MemoryStore {
    async fn recent_searches(&self) -> anyhow::Result<Vec<RecentSearch>> {
        if self.broken { return Err(anyhow!("search store offline")); }
        Ok(self.searches.clone())
    }
}

pub(crate) fn history(title: &str, timestamp: i64, time_spent_secs: i64) -> HistoryEntry {
    HistoryEntry {
        title: title.to_string(),
        display_title: title.replace('_', " "),
        description: None,
        thumbnail_url: None,
        lang: "en".to_string(),
        timestamp,
        time_spent_secs,
    }
}
