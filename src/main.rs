mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, HistoryAction, SearchAction};
use wikirec::dao::{self, HistoryInsert, RecentSearchInsert};
use wikirec::db::Database;
use wikirec::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wikirec=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let db = Database::connect(config.database_url.as_deref()).await?;
    db.run_migrations().await?;

    let mut site = WikiSite::new(&cli.lang);
    if let Some(parent) = &cli.parent_lang {
        site = site.with_parent_language(parent);
    }
    let mut ctx = RequestContext::new(site);
    if let Some((lat, lon)) = cli.location {
        ctx = ctx.with_location(Coordinate::new(lat, lon));
    }

    let db = Arc::new(db);
    let service = Arc::new(HttpContentService::new(&config)?);
    let agg = Aggregator::new(service, db.clone(), db.clone(), config);

    let kind = match cli.command {
        Commands::History { action: Some(HistoryAction::Add { title, display, description, time_spent }) } => {
            let h = HistoryInsert {
                display_title: display.unwrap_or_else(|| title.replace('_', " ")),
                title: title.replace(' ', "_"),
                description,
                thumbnail_url: None,
                lang: ctx.site.language_code().to_string(),
                timestamp: current_epoch(),
                time_spent_secs: time_spent,
            };
            dao::upsert_history(db.pool(), &h).await?;
            return Ok(());
        }
        Commands::History { action: Some(HistoryAction::Clear) } => {
            println!("removed {} history entries", dao::clear_history(db.pool()).await?);
            return Ok(());
        }
        Commands::Searches { action: Some(SearchAction::Add { text }) } => {
            dao::upsert_recent_search(db.pool(), &RecentSearchInsert { text, timestamp: current_epoch() }).await?;
            return Ok(());
        }
        Commands::Searches { action: Some(SearchAction::Clear) } => {
            println!("removed {} recent searches", dao::clear_recent_searches(db.pool()).await?);
            return Ok(());
        }
        Commands::Feed { date } => {
            if let Some(d) = date { ctx = ctx.with_date(d); }
            let feed = agg.load_feed(&ctx).await?;
            println!("{}", serde_json::to_string_pretty(&feed)?);
            return Ok(());
        }
        Commands::All => {
            let results = agg.fetch_many(&SourceKind::parameterless(), &ctx).await;
            let out: Vec<_> = results
                .into_iter()
                .map(|(kind, r)| match r {
                    Ok(items) => json!({ "source": kind.to_string(), "items": items }),
                    Err(e) => json!({ "source": kind.to_string(), "error": e.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }
        Commands::History { action: None } => SourceKind::History,
        Commands::Searches { action: None } => SourceKind::RecentSearches,
        Commands::TopRead => SourceKind::TopRead,
        Commands::Explore { term } => SourceKind::Explore { term },
        Commands::BecauseYouRead { age } => SourceKind::BecauseYouRead { age },
        Commands::Places => SourceKind::Places,
        Commands::Random => SourceKind::Random,
    };

    let items = agg
        .fetch_by_source(&kind, &ctx)
        .await
        .with_context(|| format!("fetching {kind}"))?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn current_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_in_seconds() {
        let now = current_epoch();
        // 2020-01-01 .. 2100-01-01
        assert!((1_577_836_800..4_102_444_800).contains(&now));
    }
}
