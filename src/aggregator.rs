use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::{ContentService, HttpContentService};
use crate::config::{Config, RequestContext};
use crate::db::Database;
use crate::error::Result;
use crate::locale::WikiSite;
use crate::sources::{self, SourceKind};
use crate::storage::{HistoryStore, RecentSearchStore};
use crate::types::{ContentItem, FeedContent};
use crate::variant;

/// Aggregator owns the remote service and local stores and answers per-source requests.
///
/// It keeps no session state: everything about the reader comes in through `RequestContext`.
#[derive(Clone)]
pub struct Aggregator {
    service: Arc<dyn ContentService>,
    history: Arc<dyn HistoryStore>,
    searches: Arc<dyn RecentSearchStore>,
    config: Config,
}

impl Aggregator {
    pub fn new(
        service: Arc<dyn ContentService>,
        history: Arc<dyn HistoryStore>,
        searches: Arc<dyn RecentSearchStore>,
        config: Config,
    ) -> Self {
        Self { service, history, searches, config }
    }

    /// Open the configured database (running migrations if asked) and the HTTP service.
    pub async fn connect(config: Config, run_migrations: bool) -> anyhow::Result<Self> {
        let db = Database::connect(config.database_url.as_deref()).await?;
        if run_migrations { db.run_migrations().await?; }
        let db = Arc::new(db);
        let service = Arc::new(HttpContentService::new(&config)?);
        Ok(Self::new(service, db.clone(), db, config))
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn service(&self) -> &Arc<dyn ContentService> { &self.service }
    pub fn history_store(&self) -> &dyn HistoryStore { self.history.as_ref() }
    pub fn search_store(&self) -> &dyn RecentSearchStore { self.searches.as_ref() }

    /// Retrieve items from one source. Failures propagate; there is no retry.
    pub async fn fetch_by_source(&self, kind: &SourceKind, ctx: &RequestContext) -> Result<Vec<ContentItem>> {
        let items = match kind {
            SourceKind::History => sources::history(self, ctx).await?,
            SourceKind::RecentSearches => sources::recent_searches(self, ctx).await?,
            SourceKind::TopRead => sources::top_read(self, ctx).await?,
            SourceKind::Explore { term } => sources::explore(self, ctx, term).await?,
            SourceKind::BecauseYouRead { age } => sources::because_you_read(self, ctx, *age).await?,
            SourceKind::ContinueReading => sources::continue_reading(ctx),
            SourceKind::Places => sources::places(self, ctx).await?,
            SourceKind::Random => sources::random(self, ctx).await?,
        };
        info!(source = %kind, lang = ctx.site.language_code(), count = items.len(), "fetched");
        Ok(items)
    }

    /// Query several sources concurrently; each gets its own result, in input order.
    pub async fn fetch_many(&self, kinds: &[SourceKind], ctx: &RequestContext) -> Vec<(SourceKind, Result<Vec<ContentItem>>)> {
        let results = join_all(kinds.iter().map(|k| self.fetch_by_source(k, ctx))).await;
        kinds
            .iter()
            .cloned()
            .zip(results)
            .inspect(|(kind, r)| {
                if let Err(e) = r {
                    warn!(source = %kind, error = %e, "source failed");
                }
            })
            .collect()
    }

    /// The featured-content bundle for the context date.
    pub async fn load_feed(&self, ctx: &RequestContext) -> Result<FeedContent> {
        sources::feed(self, ctx).await
    }

    /// Fix titles and descriptions for `site`'s language variant; identity when it has no parent language.
    pub async fn correct_for_language_variant(&self, items: Vec<ContentItem>, site: &WikiSite) -> Result<Vec<ContentItem>> {
        variant::correct_for_language_variant(self.service.clone(), items, site, self.config.variant.description_tie_break).await
    }
}
