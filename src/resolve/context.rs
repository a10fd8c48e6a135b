//! Production wiring for the resolution pipeline.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::db::Db;
use crate::resolve::batch::ResolveContext;
use crate::resolve::cache::PgLookupCache;
use crate::resolve::orchestrator::Resolver;
use crate::resolve::rate_limit::RateLimiter;
use crate::resolve::sources::{
    AvWikiSource, NameSource, SearchApiSource, SeesaaWikiSource, SougouWikiSource, TitleNlpSource,
};
use crate::resolve::store::PgCatalogStore;
use crate::util::env::env_parse;

impl ResolveContext {
    /// Assemble the live pipeline: Postgres-backed cache and stores, the
    /// env-configured adapters, and the single shared throttle. The scrape
    /// chain order here *is* the strategy order.
    pub fn from_env(db: Db) -> Result<Self> {
        let min_interval_ms: u64 = env_parse("SCRAPE_MIN_INTERVAL_MS", 2000u64);
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(min_interval_ms)));

        let scrapers: Vec<Arc<dyn NameSource>> = vec![
            Arc::new(AvWikiSource::from_env()?),
            Arc::new(SeesaaWikiSource::from_env()?),
            Arc::new(SougouWikiSource::from_env()?),
        ];
        info!(
            min_interval_ms,
            scrapers = scrapers.len(),
            "resolution pipeline wired"
        );

        let store = Arc::new(PgCatalogStore::new(db.clone()));
        let resolver = Resolver::new(
            Arc::new(PgLookupCache::new(db)),
            Arc::new(SearchApiSource::from_env()?),
            Arc::new(TitleNlpSource::from_env()),
            scrapers,
            limiter.clone(),
        );

        Ok(Self {
            backlog: store.clone(),
            identities: store,
            resolver,
            limiter,
        })
    }
}
