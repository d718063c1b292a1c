use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wikirec::config::EndpointConfig;
use wikirec::dao::{self, HistoryInsert};
use wikirec::db::Database;
use wikirec::prelude::*;

async fn setup() -> (TempDir, MockServer, Config) {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    let config = Config {
        database_url: Some(format!("sqlite://{}?mode=rwc", dir.path().join("wikirec.db").display())),
        endpoints: EndpointConfig { site_url: server.uri(), wikidata_url: server.uri() },
        ..Default::default()
    };
    (dir, server, config)
}

#[tokio::test]
async fn because_you_read_corrects_variant_titles_end_to_end() {
    let (_dir, server, config) = setup().await;

    let db = Database::connect(config.database_url.as_deref()).await.unwrap();
    db.run_migrations().await.unwrap();
    let seed = HistoryInsert {
        title: "Dog".into(),
        display_title: "Dog".into(),
        description: None,
        thumbnail_url: None,
        lang: "zh-hant".into(),
        timestamp: 100,
        time_spent_secs: 90,
    };
    dao::upsert_history(db.pool(), &seed).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("gsrsearch", "morelike:Dog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [
                { "pageid": 1, "title": "Wolf", "index": 1, "description": "wild canine" },
                { "pageid": 2, "title": "Fox", "index": 2, "description": "small canid" }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "info"))
        .and(query_param("titles", "Wolf|Fox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [
                { "title": "Wolf", "varianttitles": { "zh-hant": "狼", "zh-hans": "狼" } },
                { "title": "Fox", "varianttitles": { "zh-hant": "" } }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "wbgetentities"))
        .and(query_param("titles", "Wolf|Fox"))
        .and(query_param("sites", "zhwiki"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entities": {
                "Q18498": { "id": "Q18498",
                    "labels": { "zh-hant": { "language": "zh-hant", "value": "狼" } },
                    "descriptions": { "zh-hant": { "language": "zh-hant", "value": "犬科動物" } } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agg = Aggregator::connect(config, true).await.unwrap();
    let ctx = RequestContext::new(WikiSite::new("zh-hant"));
    let items = agg.fetch_by_source(&SourceKind::BecauseYouRead { age: 0 }, &ctx).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].canonical_title, "Wolf");
    assert_eq!(items[0].display_title, "狼");
    assert_eq!(items[0].description.as_deref(), Some("犬科動物"));
    assert_eq!(items[1].canonical_title, "Fox");
    assert_eq!(items[1].display_title, "Fox");
    assert_eq!(items[1].description.as_deref(), Some("small canid"));
}

#[tokio::test]
async fn failed_lookup_fails_the_source_but_not_its_neighbours() {
    let (_dir, server, config) = setup().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("gsrsearch", "morelike:Cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [{ "pageid": 1, "title": "Lion", "index": 1 }] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "query": { "pages": [] } })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "wbgetentities"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let agg = Aggregator::connect(config, true).await.unwrap();
    let ctx = RequestContext::new(WikiSite::new("zh-hans"));
    let kinds = [SourceKind::Explore { term: "Cat".into() }, SourceKind::History];
    let results = agg.fetch_many(&kinds, &ctx).await;

    match &results[0].1 {
        Err(SourceError::Status { status, .. }) => assert_eq!(*status, 500),
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(results[1].1.as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn plain_language_site_passes_results_through() {
    let (_dir, server, config) = setup().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("gsrsearch", "morelike:Cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": [{ "pageid": 1, "title": "Lion", "index": 1, "description": "big cat" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;
    // No correction lookups may happen on a site without a parent language
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "info"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let agg = Aggregator::connect(config, true).await.unwrap();
    let ctx = RequestContext::new(WikiSite::new("en"));
    let items = agg.fetch_by_source(&SourceKind::Explore { term: "Cat".into() }, &ctx).await.unwrap();
    assert_eq!(items, vec![ContentItem {
        page_id: Some(1),
        canonical_title: "Lion".into(),
        display_title: "Lion".into(),
        description: Some("big cat".into()),
        extract: None,
        thumbnail_url: None,
        coordinate: None,
        lang: "en".into(),
    }]);
}
