//! Persistent lookup cache.
//!
//! Every live success is written back under its source name so repeat runs
//! answer from the database instead of re-fetching. A code may accumulate
//! one entry per source; reads hand back the whole set ordered by the
//! declared trust rank below, so callers can take the first non-empty entry.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::db::Db;

/// Source trust ranking, lower = more trusted. Sources absent from this
/// table sort last. Reflects observed accuracy of each index, not recency.
pub const SOURCE_TRUST_RANK: &[(&str, i32)] = &[
    ("search-api", 0),
    ("av-wiki", 1),
    ("seesaa-wiki", 2),
    ("sougou-wiki", 3),
];

pub fn trust_rank(source: &str) -> i32 {
    SOURCE_TRUST_RANK
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, rank)| *rank)
        .unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LookupCacheEntry {
    pub normalized_code: String,
    pub source_name: String,
    pub performer_names: Vec<String>,
    pub crawled_at: DateTime<Utc>,
}

/// Sort cache entries by trust rank; source name breaks ties so the order is
/// stable regardless of insertion order.
pub fn sort_by_trust(entries: &mut [LookupCacheEntry]) {
    entries.sort_by(|a, b| {
        trust_rank(&a.source_name)
            .cmp(&trust_rank(&b.source_name))
            .then_with(|| a.source_name.cmp(&b.source_name))
    });
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// All cached entries for a code, most trusted first.
    async fn read(&self, code: &str) -> Result<Vec<LookupCacheEntry>>;

    /// Upsert on `(code, source)`. Failures are logged and swallowed: a
    /// broken cache write never invalidates the resolution that produced it.
    async fn write(&self, code: &str, names: &[String], source: &str);
}

pub struct PgLookupCache {
    db: Db,
}

impl PgLookupCache {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CacheStore for PgLookupCache {
    async fn read(&self, code: &str) -> Result<Vec<LookupCacheEntry>> {
        let mut entries: Vec<LookupCacheEntry> = sqlx::query_as(
            "SELECT normalized_code, source_name, performer_names, crawled_at
             FROM lookup_cache
             WHERE normalized_code = $1",
        )
        .bind(code)
        .fetch_all(&self.db.pool)
        .await?;
        sort_by_trust(&mut entries);
        Ok(entries)
    }

    async fn write(&self, code: &str, names: &[String], source: &str) {
        let res = sqlx::query(
            "INSERT INTO lookup_cache (normalized_code, source_name, performer_names, crawled_at)
             VALUES ($1, $2, $3, now())
             ON CONFLICT (normalized_code, source_name)
             DO UPDATE SET performer_names = EXCLUDED.performer_names, crawled_at = now()",
        )
        .bind(code)
        .bind(source)
        .bind(names)
        .execute(&self.db.pool)
        .await;
        if let Err(e) = res {
            warn!(code = %code, source = %source, error = %e, "lookup cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, names: &[&str]) -> LookupCacheEntry {
        LookupCacheEntry {
            normalized_code: "ABC-123".into(),
            source_name: source.into(),
            performer_names: names.iter().map(|s| s.to_string()).collect(),
            crawled_at: Utc::now(),
        }
    }

    #[test]
    fn read_order_follows_trust_rank_not_insertion() {
        let mut entries = vec![
            entry("sougou-wiki", &["b"]),
            entry("search-api", &["a"]),
            entry("av-wiki", &["c"]),
        ];
        sort_by_trust(&mut entries);
        let order: Vec<&str> = entries.iter().map(|e| e.source_name.as_str()).collect();
        assert_eq!(order, vec!["search-api", "av-wiki", "sougou-wiki"]);

        let mut reversed = vec![
            entry("av-wiki", &["c"]),
            entry("sougou-wiki", &["b"]),
            entry("search-api", &["a"]),
        ];
        sort_by_trust(&mut reversed);
        let order2: Vec<&str> = reversed.iter().map(|e| e.source_name.as_str()).collect();
        assert_eq!(order, order2);
    }

    #[test]
    fn unranked_sources_sort_last() {
        let mut entries = vec![entry("somebody-else", &["x"]), entry("sougou-wiki", &["y"])];
        sort_by_trust(&mut entries);
        assert_eq!(entries[0].source_name, "sougou-wiki");
        assert_eq!(entries[1].source_name, "somebody-else");
    }
}
