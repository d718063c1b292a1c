use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }

    /// `lat|lon`, the form the geosearch endpoint expects.
    pub fn to_query(&self) -> String { format!("{}|{}", self.lat, self.lon) }
}

/// Uniform record every source produces.
///
/// `canonical_title` is underscore-normalised and acts as the join key across
/// lookups; `display_title` is what a reader sees and may be variant-adjusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub page_id: Option<i64>,
    pub canonical_title: String,
    pub display_title: String,
    pub description: Option<String>,
    pub extract: Option<String>,
    pub thumbnail_url: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub lang: String,
}

impl ContentItem {
    pub fn new(canonical_title: impl Into<String>, display_title: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            page_id: None,
            canonical_title: canonical_title.into(),
            display_title: display_title.into(),
            description: None,
            extract: None,
            thumbnail_url: None,
            coordinate: None,
            lang: lang.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.coordinate = Some(coordinate);
        self
    }
}

// --- Featured feed bundle ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub story: String,
    pub links: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRead {
    pub date: String,
    pub articles: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureOfDay {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnThisDay {
    pub text: String,
    pub year: Option<i32>,
    pub pages: Vec<ContentItem>,
}

/// Featured content for one date: distinct groups, each optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedContent {
    pub featured_article: Option<ContentItem>,
    pub news: Vec<NewsItem>,
    pub top_read: Option<TopRead>,
    pub picture_of_day: Option<PictureOfDay>,
    pub on_this_day: Vec<OnThisDay>,
}

// --- Local store records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub display_title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub lang: String,
    pub timestamp: i64,
    pub time_spent_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub text: String,
    pub timestamp: i64,
}

/// An open reading tab: a back stack of pages and the position currently shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub back_stack: Vec<ContentItem>,
    pub position: usize,
}

impl Tab {
    pub fn current(&self) -> Option<&ContentItem> { self.back_stack.get(self.position) }
}

// --- Correction lookup results ---

/// One structured-data entity: labels and descriptions keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelledEntity {
    pub id: String,
    pub labels: HashMap<String, String>,
    pub descriptions: HashMap<String, String>,
}

impl LabelledEntity {
    pub fn label(&self, lang: &str) -> Option<&str> { self.labels.get(lang).map(String::as_str) }
    pub fn description(&self, lang: &str) -> Option<&str> { self.descriptions.get(lang).map(String::as_str) }
}

/// A page's title rendered in each language variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantTitles {
    /// Title as the content source returns it (spaces, not underscores).
    pub title: String,
    pub variants: HashMap<String, String>,
}
