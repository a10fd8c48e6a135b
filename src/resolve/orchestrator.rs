//! End-to-end resolution of a single catalog item.
//!
//! Strategies run cheapest-first: the persistent cache answers for free, the
//! search API is sanctioned and unthrottled, title extraction costs nothing
//! but is noisy (used, never cached), and the scrape chain runs last behind
//! the shared throttle. The chain is held as data — an ordered adapter list —
//! so adding or reordering a source is a wiring change, not a control-flow
//! change.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::resolve::cache::CacheStore;
use crate::resolve::rate_limit::RateLimiter;
use crate::resolve::sources::NameSource;
use crate::resolve::store::CatalogItem;

/// A successful lookup: raw candidate names plus the source tag they came
/// from (`lookup:<source>` when answered from cache).
#[derive(Debug, Clone)]
pub struct Resolution {
    pub names: Vec<String>,
    pub source: String,
}

pub struct Resolver {
    cache: Arc<dyn CacheStore>,
    search: Arc<dyn NameSource>,
    title_extract: Arc<dyn NameSource>,
    scrapers: Vec<Arc<dyn NameSource>>,
    limiter: Arc<RateLimiter>,
}

impl Resolver {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        search: Arc<dyn NameSource>,
        title_extract: Arc<dyn NameSource>,
        scrapers: Vec<Arc<dyn NameSource>>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            cache,
            search,
            title_extract,
            scrapers,
            limiter,
        }
    }

    /// Try every strategy tier in order across the given code variants.
    /// `Ok(None)` is a miss, not an error; only infrastructure failures
    /// (cache reads) propagate.
    pub async fn resolve(
        &self,
        item: &CatalogItem,
        variants: &[String],
    ) -> Result<Option<Resolution>> {
        // Tier 1: cache, probed for every variant before anything goes live.
        for variant in variants {
            for entry in self.cache.read(variant).await? {
                if entry.performer_names.is_empty() {
                    continue;
                }
                debug!(item_id = item.id, variant = %variant, source = %entry.source_name, "cache hit");
                return Ok(Some(Resolution {
                    names: entry.performer_names,
                    source: format!("lookup:{}", entry.source_name),
                }));
            }
        }

        // Tier 2: structured search (sanctioned API, no throttle).
        for variant in variants {
            let names = self.search.attempt(variant).await;
            if !names.is_empty() {
                self.cache.write(variant, &names, self.search.name()).await;
                info!(item_id = item.id, variant = %variant, "resolved via search api");
                return Ok(Some(Resolution {
                    names,
                    source: self.search.name().to_string(),
                }));
            }
        }

        // Tier 3: extraction from the full title, once. Too noisy to cache.
        let names = self.title_extract.attempt(&item.title).await;
        if !names.is_empty() {
            info!(item_id = item.id, "resolved via title extraction");
            return Ok(Some(Resolution {
                names,
                source: self.title_extract.name().to_string(),
            }));
        }

        // Tier 4: scrape chain. Every attempt pays the throttle, hit or miss.
        for variant in variants {
            for scraper in &self.scrapers {
                let names = scraper.attempt(variant).await;
                self.limiter.wait_turn().await;
                if !names.is_empty() {
                    self.cache.write(variant, &names, scraper.name()).await;
                    info!(item_id = item.id, variant = %variant, source = scraper.name(), "resolved via scrape");
                    return Ok(Some(Resolution {
                        names,
                        source: scraper.name().to_string(),
                    }));
                }
            }
        }

        debug!(item_id = item.id, "no source produced a match");
        Ok(None)
    }
}
