//! Recommended-content aggregation for encyclopedia clients.
//!
//! An [`Aggregator`](aggregator::Aggregator) pulls candidate pages from local
//! reading history, recent searches and several remote endpoints (featured feed,
//! "more like this" search, geosearch, random pages), normalises them into
//! [`ContentItem`](types::ContentItem)s and, on wikis that serve a language
//! variant, corrects titles and descriptions for that variant.

pub mod aggregator;
pub mod client;
pub mod config;
pub mod dao;
pub mod db;
pub mod error;
pub mod locale;
pub mod mapping;
pub mod sources;
pub mod storage;
pub mod types;
pub mod variant;

#[cfg(test)]
pub(crate) mod test_support;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::client::{ContentService, HttpContentService};
    pub use crate::config::{Config, RequestContext, TieBreak};
    pub use crate::error::{Result, SourceError};
    pub use crate::locale::WikiSite;
    pub use crate::sources::SourceKind;
    pub use crate::storage::{HistoryStore, RecentSearchStore};
    pub use crate::types::{ContentItem, Coordinate, FeedContent, HistoryEntry, RecentSearch, Tab};
}

pub use aggregator::Aggregator;
pub use error::SourceError;
