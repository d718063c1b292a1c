use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::header::ACCEPT_LANGUAGE;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{Config, EndpointConfig};
use crate::error::{Result, SourceError};
use crate::locale::WikiSite;
use crate::mapping::{
    entities_from_map, feed_from_payload, item_from_summary, items_from_query, variant_titles_from_query,
    ActionResponse, EntitiesResponse, FeedPayload, QueryPage, SummaryPayload,
};
use crate::types::{ContentItem, Coordinate, FeedContent, LabelledEntity, VariantTitles};

/// The remote collaborators the aggregator reads from. Every call is independent and read-only.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Featured content bundle for a date.
    async fn featured_feed(&self, site: &WikiSite, date: NaiveDate) -> Result<FeedContent>;

    /// Free-text "more like this" search, bounded by `limit`.
    async fn search_more_like(&self, site: &WikiSite, term: &str, limit: u32) -> Result<Vec<ContentItem>>;

    /// Pages near `coord`; candidates may lack coordinates.
    async fn geo_search(&self, site: &WikiSite, coord: Coordinate, radius_m: u32, limit: u32) -> Result<Vec<ContentItem>>;

    /// Exactly one random page.
    async fn random_summary(&self, site: &WikiSite) -> Result<ContentItem>;

    /// Structured-data labels/descriptions for a pipe-delimited title batch on `site_db`, in listed order.
    async fn wikidata_descriptions(&self, titles: &str, site_db: &str, lang: &str) -> Result<Vec<LabelledEntity>>;

    /// Per-variant renderings of each title in a pipe-delimited batch.
    async fn variant_titles(&self, site: &WikiSite, titles: &str) -> Result<Vec<VariantTitles>>;
}

/// `ContentService` over the MediaWiki action API, the REST API and Wikidata.
pub struct HttpContentService {
    http: reqwest::Client,
    endpoints: EndpointConfig,
}

impl HttpContentService {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.http.user_agent.clone())
            .timeout(Duration::from_millis(cfg.http.timeout_ms))
            .build()?;
        Ok(Self { http, endpoints: cfg.endpoints.clone() })
    }

    fn action_url(&self, site: &WikiSite, params: &[(&str, &str)]) -> Result<Url> {
        let base = format!("{}/w/api.php", self.endpoints.site_base(site));
        build_url(&base, params)
    }

    fn rest_url(&self, site: &WikiSite, path: &str) -> Result<Url> {
        let base = format!("{}/api/rest_v1/{}", self.endpoints.site_base(site), path.trim_start_matches('/'));
        build_url(&base, &[])
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: Url, lang: &str) -> Result<T> {
        debug!(endpoint, %url, "requesting");
        let resp = self
            .http
            .get(url)
            .header(ACCEPT_LANGUAGE, lang)
            .send()
            .await
            .map_err(|e| SourceError::Network { endpoint: endpoint.to_string(), source: e })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| SourceError::Network { endpoint: endpoint.to_string(), source: e })?;
        serde_json::from_slice(&body).map_err(|e| decode_error(endpoint, e))
    }

    async fn query_pages(&self, endpoint: &str, site: &WikiSite, params: &[(&str, &str)]) -> Result<Vec<QueryPage>> {
        let mut all: Vec<(&str, &str)> = vec![("action", "query"), ("format", "json"), ("formatversion", "2")];
        all.extend_from_slice(params);
        let url = self.action_url(site, &all)?;
        let resp: ActionResponse = self.get_json(endpoint, url, site.language_code()).await?;
        if let Some(err) = resp.error {
            return Err(SourceError::Api { endpoint: endpoint.to_string(), code: err.code, info: err.info });
        }
        Ok(resp.query.map(|q| q.pages).unwrap_or_default())
    }
}

#[async_trait]
impl ContentService for HttpContentService {
    async fn featured_feed(&self, site: &WikiSite, date: NaiveDate) -> Result<FeedContent> {
        let path = format!("feed/featured/{:04}/{:02}/{:02}", date.year(), date.month(), date.day());
        let url = self.rest_url(site, &path)?;
        let payload: FeedPayload = self.get_json("featured_feed", url, site.language_code()).await?;
        Ok(feed_from_payload(payload, site))
    }

    async fn search_more_like(&self, site: &WikiSite, term: &str, limit: u32) -> Result<Vec<ContentItem>> {
        let search = format!("morelike:{term}");
        let limit = limit.to_string();
        let pages = self
            .query_pages(
                "search_more_like",
                site,
                &[
                    ("generator", "search"),
                    ("gsrsearch", search.as_str()),
                    ("gsrlimit", limit.as_str()),
                    ("gsrnamespace", "0"),
                    ("gsrqiprofile", "classic_noboostlinks"),
                    ("prop", "description|pageimages|info"),
                    ("piprop", "thumbnail"),
                    ("pilicense", "any"),
                    ("pithumbsize", "320"),
                    ("pilimit", limit.as_str()),
                    ("inprop", "varianttitles|displaytitle"),
                ],
            )
            .await?;
        Ok(items_from_query(pages, site))
    }

    async fn geo_search(&self, site: &WikiSite, coord: Coordinate, radius_m: u32, limit: u32) -> Result<Vec<ContentItem>> {
        let ggscoord = coord.to_query();
        let radius = radius_m.to_string();
        let limit = limit.to_string();
        let pages = self
            .query_pages(
                "geo_search",
                site,
                &[
                    ("generator", "geosearch"),
                    ("ggscoord", ggscoord.as_str()),
                    ("ggsradius", radius.as_str()),
                    ("ggslimit", limit.as_str()),
                    ("colimit", limit.as_str()),
                    ("prop", "coordinates|description|pageimages|info"),
                    ("piprop", "thumbnail"),
                    ("pilicense", "any"),
                    ("pithumbsize", "320"),
                    ("inprop", "varianttitles|displaytitle"),
                ],
            )
            .await?;
        Ok(items_from_query(pages, site))
    }

    async fn random_summary(&self, site: &WikiSite) -> Result<ContentItem> {
        let url = self.rest_url(site, "page/random/summary")?;
        let payload: SummaryPayload = self.get_json("random_summary", url, site.language_code()).await?;
        Ok(item_from_summary(payload, site))
    }

    async fn wikidata_descriptions(&self, titles: &str, site_db: &str, lang: &str) -> Result<Vec<LabelledEntity>> {
        let base = format!("{}/w/api.php", self.endpoints.wikidata_url.trim_end_matches('/'));
        let url = build_url(
            &base,
            &[
                ("action", "wbgetentities"),
                ("format", "json"),
                ("formatversion", "2"),
                ("props", "descriptions|labels"),
                ("titles", titles),
                ("sites", site_db),
                ("languages", lang),
            ],
        )?;
        debug!(site_db, lang, batch = titles.split('|').count(), "wikidata description lookup");
        let resp: EntitiesResponse = self.get_json("wikidata_descriptions", url, lang).await?;
        if let Some(err) = resp.error {
            return Err(SourceError::Api { endpoint: "wikidata_descriptions".into(), code: err.code, info: err.info });
        }
        entities_from_map(resp.entities).map_err(|e| decode_error("wikidata_descriptions", e))
    }

    async fn variant_titles(&self, site: &WikiSite, titles: &str) -> Result<Vec<VariantTitles>> {
        debug!(batch = titles.split('|').count(), "variant title lookup");
        let pages = self
            .query_pages("variant_titles", site, &[("prop", "info"), ("inprop", "varianttitles"), ("titles", titles)])
            .await?;
        Ok(variant_titles_from_query(pages))
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> Result<Url> {
    let parsed = if params.is_empty() { Url::parse(base) } else { Url::parse_with_params(base, params) };
    parsed.map_err(|e| SourceError::Decode { endpoint: base.to_string(), reason: format!("invalid url: {e}") })
}

fn decode_error(endpoint: &str, e: serde_json::Error) -> SourceError {
    SourceError::Decode { endpoint: endpoint.to_string(), reason: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_url_targets_parent_wiki() {
        let svc = HttpContentService::new(&Config::default()).unwrap();
        let url = svc.action_url(&WikiSite::new("zh-hans"), &[("titles", "A|B")]).unwrap();
        assert_eq!(url.host_str(), Some("zh.wikipedia.org"));
        assert_eq!(url.path(), "/w/api.php");
        assert_eq!(url.query(), Some("titles=A%7CB"));
    }

    #[test]
    fn rest_url_joins_path() {
        let svc = HttpContentService::new(&Config::default()).unwrap();
        let url = svc.rest_url(&WikiSite::new("en"), "/page/random/summary").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/api/rest_v1/page/random/summary");
    }
}
