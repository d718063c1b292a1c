use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aggregator::Aggregator;
use crate::config::RequestContext;
use crate::error::Result;
use crate::mapping::{item_from_history, item_from_recent_search, preferred_size_url, remove_underscores};
use crate::types::{ContentItem, FeedContent, Tab, TopRead};

/// Where recommended content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceKind {
    History,
    RecentSearches,
    TopRead,
    Explore { term: String },
    BecauseYouRead { age: usize },
    ContinueReading,
    Places,
    Random,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::RecentSearches => "recent-searches",
            Self::TopRead => "top-read",
            Self::Explore { .. } => "explore",
            Self::BecauseYouRead { .. } => "because-you-read",
            Self::ContinueReading => "continue-reading",
            Self::Places => "places",
            Self::Random => "random",
        }
    }

    /// Every source that needs no extra parameters, plus "because you read" for the latest engaged entry.
    pub fn parameterless() -> Vec<SourceKind> {
        vec![
            Self::History,
            Self::RecentSearches,
            Self::TopRead,
            Self::BecauseYouRead { age: 0 },
            Self::ContinueReading,
            Self::Places,
            Self::Random,
        ]
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explore { term } => write!(f, "explore({term})"),
            Self::BecauseYouRead { age } => write!(f, "because-you-read({age})"),
            other => f.write_str(other.name()),
        }
    }
}

pub(crate) async fn history(agg: &Aggregator, _ctx: &RequestContext) -> Result<Vec<ContentItem>> {
    let entries = agg.history_store().filter_history("").await?;
    Ok(entries.iter().map(item_from_history).collect())
}

pub(crate) async fn recent_searches(agg: &Aggregator, ctx: &RequestContext) -> Result<Vec<ContentItem>> {
    let searches = agg.search_store().recent_searches().await?;
    Ok(searches.iter().map(|s| item_from_recent_search(s, &ctx.site)).collect())
}

/// Featured feed for the context date; only the top-read group is variant-corrected.
pub(crate) async fn feed(agg: &Aggregator, ctx: &RequestContext) -> Result<FeedContent> {
    let mut feed = agg.service().featured_feed(&ctx.site, ctx.feed_date()).await?;
    if ctx.site.has_parent_language() {
        if let Some(top_read) = feed.top_read.take() {
            let articles = agg.correct_for_language_variant(top_read.articles, &ctx.site).await?;
            feed.top_read = Some(TopRead { date: top_read.date, articles });
        }
    }
    Ok(feed)
}

pub(crate) async fn top_read(agg: &Aggregator, ctx: &RequestContext) -> Result<Vec<ContentItem>> {
    Ok(feed(agg, ctx).await?.top_read.map(|t| t.articles).unwrap_or_default())
}

pub(crate) async fn explore(agg: &Aggregator, ctx: &RequestContext, term: &str) -> Result<Vec<ContentItem>> {
    let limit = agg.config().sources.suggestion_count;
    let items = agg.service().search_more_like(&ctx.site, term, limit).await?;
    agg.correct_for_language_variant(items, &ctx.site).await
}

pub(crate) async fn because_you_read(agg: &Aggregator, ctx: &RequestContext, age: usize) -> Result<Vec<ContentItem>> {
    let threshold = agg.config().sources.engagement_threshold_secs;
    match agg.history_store().find_entry_for_read_more(age, threshold).await? {
        Some(entry) => explore(agg, ctx, &remove_underscores(&entry.title)).await,
        None => Ok(Vec::new()),
    }
}

pub(crate) fn continue_reading(ctx: &RequestContext) -> Vec<ContentItem> {
    ctx.tabs.iter().filter_map(Tab::current).cloned().collect()
}

pub(crate) async fn places(agg: &Aggregator, ctx: &RequestContext) -> Result<Vec<ContentItem>> {
    let Some(location) = ctx.last_location else { return Ok(Vec::new()) };
    let cfg = &agg.config().sources;
    let candidates = agg
        .service()
        .geo_search(&ctx.site, location, cfg.geosearch_radius_m, cfg.geosearch_limit)
        .await?;
    Ok(candidates
        .into_iter()
        .filter(|c| c.coordinate.is_some())
        .map(|mut c| {
            c.thumbnail_url = c
                .thumbnail_url
                .filter(|t| !t.is_empty())
                .map(|t| preferred_size_url(&t, cfg.places_thumb_size));
            c
        })
        .collect())
}

/// Fixed number of single draws; duplicates are only removed afterwards.
pub(crate) async fn random(agg: &Aggregator, ctx: &RequestContext) -> Result<Vec<ContentItem>> {
    let count = agg.config().sources.random_count;
    let mut drawn = Vec::with_capacity(count);
    for _ in 0..count {
        drawn.push(agg.service().random_summary(&ctx.site).await?);
    }
    Ok(distinct(drawn))
}

/// Order-preserving dedupe by full equality.
pub fn distinct(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut out: Vec<ContentItem> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence() {
        let a = ContentItem::new("A", "A", "en");
        let b = ContentItem::new("B", "B", "en");
        let c = ContentItem::new("C", "C", "en");
        let out = distinct(vec![a.clone(), a.clone(), b.clone(), c.clone(), a.clone()]);
        assert_eq!(out, vec![a, b, c]);
    }

    #[test]
    fn distinct_compares_every_field() {
        let a = ContentItem::new("A", "A", "en");
        let a_described = a.clone().with_description("letter");
        assert_eq!(distinct(vec![a.clone(), a_described.clone()]).len(), 2);
    }

    #[test]
    fn continue_reading_skips_tabs_without_current_page() {
        let page = ContentItem::new("Moon", "Moon", "en");
        let ctx = RequestContext::default().with_tabs(vec![
            Tab { back_stack: vec![ContentItem::new("Sun", "Sun", "en"), page.clone()], position: 1 },
            Tab::default(),
            Tab { back_stack: vec![page.clone()], position: 4 },
        ]);
        assert_eq!(continue_reading(&ctx), vec![page]);
    }

    #[test]
    fn kinds_round_trip_through_tagged_json() {
        let kind = SourceKind::Explore { term: "Rust".into() };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"explore","term":"Rust"}"#);
        assert_eq!(kind.to_string(), "explore(Rust)");
        assert_eq!(SourceKind::Places.to_string(), "places");
    }
}
