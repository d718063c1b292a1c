use anyhow::{Context, Result};
use directories::ProjectDirs;
use sqlx::{any::AnyConnectOptions, AnyPool, ConnectOptions, migrate::Migrator};
use sqlx::any::AnyPoolOptions;
use std::{path::PathBuf, str::FromStr};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};

use crate::dao;
use crate::storage::{HistoryStore, RecentSearchStore};
use crate::types::{HistoryEntry, RecentSearch};

// Ensure drivers are installed exactly once for sqlx::any
static INSTALL_DRIVERS: Once = Once::new();

// Embed SQL migrations from the migrations/ directory
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed history and recent-search store.
#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    // Create a connection pool. If database_url is None, use a SQLite file in the user's data directory.
    pub async fn connect(database_url: Option<&str>) -> Result<Self> {
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);

        let url = match database_url {
            Some(u) if !u.trim().is_empty() => u.to_string(),
            _ => default_sqlite_url()?,
        };

        let opts = AnyConnectOptions::from_str(&url)
            .with_context(|| format!("invalid database URL: {url}"))?;
        // Quiet by default; callers can enable SQLX_LOG if they want
        let opts = opts.disable_statement_logging();

        // An in-memory database only exists on its own connection
        let in_memory = url.contains(":memory:");
        let mut pool_opts = AnyPoolOptions::new().max_connections(if in_memory { 1 } else { 10 });
        if in_memory {
            pool_opts = pool_opts.idle_timeout(None::<Duration>).max_lifetime(None::<Duration>);
        }
        let pool = pool_opts
            .connect_with(opts)
            .await
            .with_context(|| format!("failed to connect to database: {url}"))?;

        debug!(%url, "database connected");
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        match MIGRATOR.run(&self.pool).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let msg = e.to_string();
                if msg.contains("was previously applied but has been modified") {
                    warn!("migration ledger out of date; resetting");
                    sqlx::query("DELETE FROM _sqlx_migrations").execute(&self.pool).await?;
                    MIGRATOR.run(&self.pool).await.context("running migrations after ledger reset")
                } else {
                    Err(e).context("running migrations")
                }
            }
        }
    }

    pub fn pool(&self) -> &AnyPool { &self.pool }
}

#[async_trait::async_trait]
impl HistoryStore for Database {
    async fn filter_history(&self, filter: &str) -> Result<Vec<HistoryEntry>> {
        dao::filter_history(&self.pool, filter).await
    }

    async fn find_entry_for_read_more(&self, age: usize, min_time_spent_secs: i64) -> Result<Option<HistoryEntry>> {
        dao::find_entry_for_read_more(&self.pool, age, min_time_spent_secs).await
    }
}

#[async_trait::async_trait]
impl RecentSearchStore for Database {
    async fn recent_searches(&self) -> Result<Vec<RecentSearch>> {
        dao::list_recent_searches(&self.pool).await
    }
}

fn default_sqlite_url() -> Result<String> {
    let proj = ProjectDirs::from("dev", "wikirec", "wikirec")
        .context("unable to determine data directory for default sqlite path")?;
    let mut path: PathBuf = proj.data_dir().to_path_buf();
    std::fs::create_dir_all(&path).with_context(|| format!("creating data dir: {}", path.display()))?;
    path.push("wikirec.db");

    // Encode spaces in the path for a valid sqlite URL
    let path_str = path.to_string_lossy().replace(' ', "%20");
    Ok(format!("sqlite://{path_str}?mode=rwc"))
}
