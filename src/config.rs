use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::locale::WikiSite;
use crate::types::{Coordinate, Tab};

/// Which entry wins when several structured-data entities carry the same label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    #[default]
    FirstListed,
    LastListed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("wikirec/{} (https://github.com/wikirec/wikirec)", env!("CARGO_PKG_VERSION")),
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of a wiki; `{subdomain}` is replaced with the site's host label.
    pub site_url: String,
    pub wikidata_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            site_url: "https://{subdomain}.wikipedia.org".to_string(),
            wikidata_url: "https://www.wikidata.org".to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn site_base(&self, site: &WikiSite) -> String {
        self.site_url.replace("{subdomain}", site.subdomain()).trim_end_matches('/').to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Result bound for "more like this" searches.
    pub suggestion_count: u32,
    pub geosearch_radius_m: u32,
    pub geosearch_limit: u32,
    /// Number of single-item random draws before deduplication.
    pub random_count: usize,
    /// Preferred width of place thumbnails, in pixels.
    pub places_thumb_size: u32,
    /// Minimum reading time for a history entry to seed "because you read".
    pub engagement_threshold_secs: i64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            suggestion_count: 5,
            geosearch_radius_m: 10_000,
            geosearch_limit: 10,
            random_count: 5,
            places_thumb_size: 160,
            engagement_threshold_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    pub description_tie_break: TieBreak,
}

/// Process-wide settings: defaults, then an optional TOML file, then `WIKIREC_*` env vars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_url: Option<String>,
    pub http: HttpConfig,
    pub endpoints: EndpointConfig,
    pub sources: SourceConfig,
    pub variant: VariantConfig,
}

impl Config {
    /// Load from `path`, or from the default location if it exists, then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };
        let mut cfg = match file {
            Some(p) => {
                let text = std::fs::read_to_string(&p)
                    .with_context(|| format!("reading config file: {}", p.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing config file: {}", p.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(Into::into)
    }

    pub(crate) fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| var(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("WIKIREC_USER_AGENT") { self.http.user_agent = v; }
        if let Some(v) = non_empty("WIKIREC_TIMEOUT_MS").and_then(|s| s.parse().ok()) { self.http.timeout_ms = v; }
        if let Some(v) = non_empty("WIKIREC_SITE_URL") { self.endpoints.site_url = v; }
        if let Some(v) = non_empty("WIKIREC_WIKIDATA_URL") { self.endpoints.wikidata_url = v; }
        if let Some(v) = non_empty("WIKIREC_DATABASE_URL") { self.database_url = Some(v); }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "wikirec", "wikirec").map(|p| p.config_dir().join("config.toml"))
}

/// Everything a single aggregation call needs to know about the reader's session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub site: WikiSite,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    /// Last location the places map was centred on.
    #[serde(default)]
    pub last_location: Option<Coordinate>,
    /// Feed date; today in UTC when unset.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl RequestContext {
    pub fn new(site: WikiSite) -> Self { Self { site, ..Default::default() } }

    pub fn with_tabs(mut self, tabs: Vec<Tab>) -> Self { self.tabs = tabs; self }

    pub fn with_location(mut self, location: Coordinate) -> Self { self.last_location = Some(location); self }

    pub fn with_date(mut self, date: NaiveDate) -> Self { self.date = Some(date); self }

    pub fn feed_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}
