//! Language-variant correction.
//!
//! Sources on a variant wiki (for example `zh-hant`) can answer with titles and
//! descriptions in the parent language's default script. Correction batches the
//! canonical titles, asks the variant-title service and the structured-data
//! description service at the same time, and rewrites each item from the two
//! answers. Items keep their order and none are added or dropped.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::ContentService;
use crate::config::TieBreak;
use crate::error::Result;
use crate::locale::WikiSite;
use crate::mapping::add_underscores;
use crate::types::{ContentItem, LabelledEntity, VariantTitles};

/// Pipe-delimited lookup key over every item's canonical title, repeats included.
pub fn batch_titles(items: &[ContentItem]) -> String {
    items.iter().map(|i| i.canonical_title.as_str()).collect::<Vec<_>>().join("|")
}

/// Correct display titles and descriptions for `site`'s language variant.
///
/// Returns `items` untouched, without any remote call, when the site declares no
/// parent language or there is nothing to correct. Fails if either lookup fails.
pub async fn correct_for_language_variant(
    service: Arc<dyn ContentService>,
    items: Vec<ContentItem>,
    site: &WikiSite,
    tie_break: TieBreak,
) -> Result<Vec<ContentItem>> {
    if !site.has_parent_language() || items.is_empty() {
        return Ok(items);
    }
    let titles = batch_titles(&items);
    let lang = site.language_code().to_string();
    debug!(lang = %lang, count = items.len(), "correcting for language variant");

    let descriptions: JoinHandle<Result<Vec<LabelledEntity>>> = {
        let service = service.clone();
        let titles = titles.clone();
        let db_name = site.db_name();
        let lang = lang.clone();
        tokio::spawn(async move { service.wikidata_descriptions(&titles, &db_name, &lang).await })
    };
    let variants: JoinHandle<Result<Vec<VariantTitles>>> = {
        let site = site.clone();
        tokio::spawn(async move { service.variant_titles(&site, &titles).await })
    };

    let (entities, variant_titles) = tokio::try_join!(joined(descriptions), joined(variants))?;
    Ok(merge_corrections(items, &variant_titles, &entities, &lang, tie_break))
}

async fn joined<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await?
}

/// Apply lookup answers to `items`, in order.
///
/// The display title comes from the variant rendering whose page title matches the
/// canonical title; the description comes from the entity whose `lang` label equals
/// the (possibly replaced) display title. Misses keep the original text.
pub fn merge_corrections(
    items: Vec<ContentItem>,
    variants: &[VariantTitles],
    entities: &[LabelledEntity],
    lang: &str,
    tie_break: TieBreak,
) -> Vec<ContentItem> {
    items
        .into_iter()
        .map(|mut item| {
            let display = variants
                .iter()
                .find(|v| add_underscores(&v.title) == item.canonical_title)
                .and_then(|v| v.variants.get(lang))
                .filter(|t| !t.is_empty());
            if let Some(display) = display {
                item.display_title = display.clone();
            }
            if let Some(entity) = entity_labelled(entities, lang, &item.display_title, tie_break) {
                if let Some(description) = entity.description(lang) {
                    item.description = Some(description.to_string());
                }
            }
            item
        })
        .collect()
}

fn entity_labelled<'a>(entities: &'a [LabelledEntity], lang: &str, label: &str, tie_break: TieBreak) -> Option<&'a LabelledEntity> {
    let matches = |e: &&LabelledEntity| e.label(lang) == Some(label);
    match tie_break {
        TieBreak::FirstListed => entities.iter().find(matches),
        TieBreak::LastListed => entities.iter().rev().find(matches),
    }
}
