//! Catalog backlog access and performer persistence.
//!
//! Both write operations are idempotent so overlapping or repeated batch
//! runs cannot create duplicates: performers upsert on their unique name and
//! links insert-or-ignore on the `(item_id, performer_id)` pair.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;
use tracing::{debug, instrument};

use crate::db::Db;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: i64,
    pub normalized_code: String,
    pub original_code: Option<String>,
    pub title: String,
    pub origin_source: String,
}

#[async_trait]
pub trait Backlog: Send + Sync {
    /// Items still missing a performer link, ordered by id ascending so
    /// pagination stays stable across repeated invocations.
    async fn list_unresolved_items(
        &self,
        limit: i64,
        offset: i64,
        source_filter: Option<&str>,
    ) -> Result<Vec<CatalogItem>>;
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert-or-reuse by unique name; returns the performer id either way.
    async fn upsert_performer(&self, name: &str) -> Result<i64>;

    /// Insert-or-ignore on the unique pair; linking twice is a no-op.
    async fn link_performer(&self, item_id: i64, performer_id: i64) -> Result<()>;
}

pub struct PgCatalogStore {
    db: Db,
}

impl PgCatalogStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Backlog for PgCatalogStore {
    #[instrument(skip(self))]
    async fn list_unresolved_items(
        &self,
        limit: i64,
        offset: i64,
        source_filter: Option<&str>,
    ) -> Result<Vec<CatalogItem>> {
        let items: Vec<CatalogItem> = sqlx::query_as(
            "SELECT ci.id, ci.normalized_code, ci.original_code, ci.title, ci.origin_source
             FROM catalog_items ci
             WHERE NOT EXISTS (
                 SELECT 1 FROM item_performers ip WHERE ip.item_id = ci.id
             )
             AND ($3::text IS NULL OR ci.origin_source = $3)
             ORDER BY ci.id ASC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .bind(source_filter)
        .fetch_all(&self.db.pool)
        .await?;
        debug!(count = items.len(), "fetched unresolved backlog page");
        Ok(items)
    }
}

#[async_trait]
impl IdentityStore for PgCatalogStore {
    async fn upsert_performer(&self, name: &str) -> Result<i64> {
        // The no-op update makes RETURNING work on the conflict path too, so
        // insert and reuse are a single round trip.
        let row = sqlx::query(
            "INSERT INTO performers (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(row.get::<i64, _>("id"))
    }

    async fn link_performer(&self, item_id: i64, performer_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO item_performers (item_id, performer_id) VALUES ($1, $2)
             ON CONFLICT (item_id, performer_id) DO NOTHING",
        )
        .bind(item_id)
        .bind(performer_id)
        .execute(&self.db.pool)
        .await?;
        Ok(())
    }
}
