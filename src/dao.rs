use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{any::AnyRow, AnyPool, Row};

use crate::types::{HistoryEntry, RecentSearch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryInsert {
    pub title: String,
    pub display_title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub lang: String,
    pub timestamp: i64, // epoch seconds
    pub time_spent_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSearchInsert {
    pub text: String,
    pub timestamp: i64,
}

// COALESCE keeps NULL away from the Any driver, which cannot decode it into Option<String>
const HISTORY_COLUMNS: &str = "title, display_title, COALESCE(description, '') AS description, \
     COALESCE(thumbnail_url, '') AS thumbnail_url, lang, timestamp, time_spent_secs";

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn history_from_row(row: &AnyRow) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
        title: row.try_get("title")?,
        display_title: row.try_get("display_title")?,
        description: non_empty(row.try_get("description")?),
        thumbnail_url: non_empty(row.try_get("thumbnail_url")?),
        lang: row.try_get("lang")?,
        timestamp: row.try_get("timestamp")?,
        time_spent_secs: row.try_get("time_spent_secs")?,
    })
}

/// Record a visit; revisiting a page in the same language refreshes it and accumulates reading time.
pub async fn upsert_history(pool: &AnyPool, h: &HistoryInsert) -> Result<()> {
    sqlx::query(
        "INSERT INTO history(title, display_title, description, thumbnail_url, lang, timestamp, time_spent_secs)\n         VALUES(?, ?, ?, ?, ?, ?, ?)\n         ON CONFLICT(title, lang) DO UPDATE SET\n           display_title=excluded.display_title, description=excluded.description,\n           thumbnail_url=excluded.thumbnail_url, timestamp=excluded.timestamp,\n           time_spent_secs=history.time_spent_secs + excluded.time_spent_secs",
    )
    .bind(&h.title)
    .bind(&h.display_title)
    .bind(&h.description)
    .bind(&h.thumbnail_url)
    .bind(&h.lang)
    .bind(h.timestamp)
    .bind(h.time_spent_secs)
    .execute(pool)
    .await?;
    Ok(())
}

/// Escape LIKE metacharacters so `_` in canonical titles matches literally.
fn escape_like(filter: &str) -> String {
    let mut out = String::with_capacity(filter.len());
    for c in filter.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn filter_history(pool: &AnyPool, filter: &str) -> Result<Vec<HistoryEntry>> {
    let like = format!("%{}%", escape_like(filter.trim()));
    let rows = sqlx::query(&format!(
        "SELECT {HISTORY_COLUMNS} FROM history\n         WHERE title LIKE ? ESCAPE '\\' OR display_title LIKE ? ESCAPE '\\'\n         ORDER BY timestamp DESC"
    ))
    .bind(&like)
    .bind(&like)
    .fetch_all(pool)
    .await?;
    rows.iter().map(history_from_row).collect()
}

/// Up to `age + 1` engaged entries, newest first; the last one is the pick.
pub async fn find_entry_for_read_more(pool: &AnyPool, age: usize, min_time_spent_secs: i64) -> Result<Option<HistoryEntry>> {
    let rows = sqlx::query(&format!(
        "SELECT {HISTORY_COLUMNS} FROM history\n         WHERE time_spent_secs >= ?\n         ORDER BY timestamp DESC LIMIT ?"
    ))
    .bind(min_time_spent_secs)
    .bind(i64::try_from(age).unwrap_or(i64::MAX).saturating_add(1))
    .fetch_all(pool)
    .await?;
    rows.last().map(history_from_row).transpose()
}

pub async fn upsert_recent_search(pool: &AnyPool, s: &RecentSearchInsert) -> Result<()> {
    sqlx::query(
        "INSERT INTO recent_searches(text, timestamp) VALUES(?, ?)\n         ON CONFLICT(text) DO UPDATE SET timestamp=excluded.timestamp",
    )
    .bind(s.text.trim())
    .bind(s.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_recent_searches(pool: &AnyPool) -> Result<Vec<RecentSearch>> {
    let rows = sqlx::query("SELECT text, timestamp FROM recent_searches ORDER BY timestamp DESC")
        .fetch_all(pool)
        .await?;
    rows.iter()
        .map(|r| -> Result<RecentSearch> { Ok(RecentSearch { text: r.try_get("text")?, timestamp: r.try_get("timestamp")? }) })
        .collect()
}

pub async fn clear_history(pool: &AnyPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM history").execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn clear_recent_searches(pool: &AnyPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM recent_searches").execute(pool).await?;
    Ok(result.rows_affected())
}
