use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::locale::WikiSite;
use crate::types::{
    ContentItem, Coordinate, FeedContent, HistoryEntry, LabelledEntity, NewsItem, OnThisDay, PictureOfDay,
    RecentSearch, TopRead, VariantTitles,
};

// --- Wire shapes ---

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ImageRef {
    pub source: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SummaryTitles {
    pub canonical: Option<String>,
    pub display: Option<String>,
}

/// REST page summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SummaryPayload {
    #[serde(default)]
    pub title: String,
    pub displaytitle: Option<String>,
    pub titles: Option<SummaryTitles>,
    pub pageid: Option<i64>,
    pub lang: Option<String>,
    pub description: Option<String>,
    pub extract: Option<String>,
    pub thumbnail: Option<ImageRef>,
    pub coordinates: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MostReadPayload {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub articles: Vec<SummaryPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TextRef {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ImagePayload {
    #[serde(default)]
    pub title: String,
    pub thumbnail: Option<ImageRef>,
    pub image: Option<ImageRef>,
    pub description: Option<TextRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct NewsPayload {
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub links: Vec<SummaryPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OnThisDayPayload {
    #[serde(default)]
    pub text: String,
    pub year: Option<i32>,
    #[serde(default)]
    pub pages: Vec<SummaryPayload>,
}

/// REST featured feed for one day.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FeedPayload {
    pub tfa: Option<SummaryPayload>,
    #[serde(default)]
    pub news: Vec<NewsPayload>,
    pub mostread: Option<MostReadPayload>,
    pub image: Option<ImagePayload>,
    #[serde(default)]
    pub onthisday: Vec<OnThisDayPayload>,
}

/// Page object from the action API (`formatversion=2`).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QueryPage {
    pub pageid: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub displaytitle: Option<String>,
    #[serde(default)]
    pub varianttitles: HashMap<String, String>,
    pub description: Option<String>,
    pub extract: Option<String>,
    pub thumbnail: Option<ImageRef>,
    pub coordinates: Option<Vec<Coordinate>>,
    #[serde(default)]
    pub index: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QueryPages {
    #[serde(default)]
    pub pages: Vec<QueryPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// Action API envelope: either `query` or `error` is present.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActionResponse {
    pub error: Option<ApiErrorBody>,
    pub query: Option<QueryPages>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LangValue {
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct EntityPayload {
    pub id: Option<String>,
    #[serde(default)]
    pub labels: HashMap<String, LangValue>,
    #[serde(default)]
    pub descriptions: HashMap<String, LangValue>,
}

/// `wbgetentities` response. Entities stay a JSON map so the listed order survives.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EntitiesResponse {
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub entities: serde_json::Map<String, serde_json::Value>,
}

// --- Title helpers ---

pub fn add_underscores(title: &str) -> String { title.trim().replace(' ', "_") }

pub fn remove_underscores(title: &str) -> String { title.replace('_', " ") }

static THUMB_WIDTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)px-([^/]+)$").unwrap());

/// Rewrite a sized thumbnail URL (`.../320px-Name.jpg`) to the preferred width.
/// Only the last path segment is touched; URLs without a size segment are returned unchanged.
pub fn preferred_size_url(url: &str, size: u32) -> String {
    THUMB_WIDTH.replace(url, format!("/{size}px-$2").as_str()).into_owned()
}

/// Display title for `lang`: the variant rendering, else `displaytitle`, else the plain title.
fn query_display_title(page: &QueryPage, lang: &str) -> String {
    page.varianttitles
        .get(lang)
        .filter(|s| !s.is_empty())
        .or(page.displaytitle.as_ref().filter(|s| !s.is_empty()))
        .cloned()
        .unwrap_or_else(|| page.title.clone())
}

// --- Conversions ---

pub(crate) fn item_from_summary(s: SummaryPayload, site: &WikiSite) -> ContentItem {
    let titles = s.titles.unwrap_or_default();
    let canonical = add_underscores(titles.canonical.as_deref().unwrap_or(&s.title));
    let display = titles
        .display
        .or(s.displaytitle)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| remove_underscores(&canonical));
    ContentItem {
        page_id: s.pageid,
        canonical_title: canonical,
        display_title: display,
        description: s.description.filter(|d| !d.is_empty()),
        extract: s.extract.filter(|e| !e.is_empty()),
        thumbnail_url: s.thumbnail.map(|t| t.source),
        coordinate: s.coordinates,
        lang: s.lang.unwrap_or_else(|| site.language_code().to_string()),
    }
}

pub(crate) fn item_from_query_page(p: QueryPage, site: &WikiSite) -> ContentItem {
    let display = query_display_title(&p, site.language_code());
    ContentItem {
        page_id: p.pageid,
        canonical_title: add_underscores(&p.title),
        display_title: display,
        description: p.description.filter(|d| !d.is_empty()),
        extract: p.extract.filter(|e| !e.is_empty()),
        thumbnail_url: p.thumbnail.map(|t| t.source),
        coordinate: p.coordinates.and_then(|c| c.into_iter().next()),
        lang: site.language_code().to_string(),
    }
}

/// Action API search results come back unordered; `index` carries the rank.
pub(crate) fn items_from_query(mut pages: Vec<QueryPage>, site: &WikiSite) -> Vec<ContentItem> {
    pages.sort_by_key(|p| p.index.unwrap_or(i64::MAX));
    pages.into_iter().map(|p| item_from_query_page(p, site)).collect()
}

pub(crate) fn feed_from_payload(f: FeedPayload, site: &WikiSite) -> FeedContent {
    let items = |v: Vec<SummaryPayload>| v.into_iter().map(|s| item_from_summary(s, site)).collect::<Vec<_>>();
    FeedContent {
        featured_article: f.tfa.map(|s| item_from_summary(s, site)),
        news: f.news.into_iter().map(|n| NewsItem { story: n.story, links: items(n.links) }).collect(),
        top_read: f.mostread.map(|m| TopRead { date: m.date, articles: items(m.articles) }),
        picture_of_day: f.image.map(|i| PictureOfDay {
            title: i.title,
            thumbnail_url: i.thumbnail.map(|t| t.source),
            image_url: i.image.map(|t| t.source),
            description: i.description.and_then(|d| d.text),
        }),
        on_this_day: f.onthisday.into_iter().map(|o| OnThisDay { text: o.text, year: o.year, pages: items(o.pages) }).collect(),
    }
}

pub(crate) fn variant_titles_from_query(pages: Vec<QueryPage>) -> Vec<VariantTitles> {
    pages.into_iter().map(|p| VariantTitles { title: p.title, variants: p.varianttitles }).collect()
}

/// Decode entities in listed order, skipping "missing" placeholders that carry no labels.
pub(crate) fn entities_from_map(map: serde_json::Map<String, serde_json::Value>) -> Result<Vec<LabelledEntity>, serde_json::Error> {
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        let e: EntityPayload = serde_json::from_value(value)?;
        if e.labels.is_empty() && e.descriptions.is_empty() { continue; }
        out.push(LabelledEntity {
            id: e.id.unwrap_or(key),
            labels: e.labels.into_iter().map(|(k, v)| (k, v.value)).collect(),
            descriptions: e.descriptions.into_iter().map(|(k, v)| (k, v.value)).collect(),
        });
    }
    Ok(out)
}

pub fn item_from_history(h: &HistoryEntry) -> ContentItem {
    ContentItem {
        page_id: None,
        canonical_title: add_underscores(&h.title),
        display_title: if h.display_title.is_empty() { remove_underscores(&h.title) } else { h.display_title.clone() },
        description: h.description.clone(),
        extract: None,
        thumbnail_url: h.thumbnail_url.clone(),
        coordinate: None,
        lang: h.lang.clone(),
    }
}

pub fn item_from_recent_search(s: &RecentSearch, site: &WikiSite) -> ContentItem {
    let text = s.text.trim();
    ContentItem::new(add_underscores(text), text, site.language_code())
}
