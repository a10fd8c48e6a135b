//! Backlog batch driver.
//!
//! Pages through items missing performer links and runs the full pipeline
//! per item: variants → orchestrator → validator → persistence. Each item is
//! its own failure boundary: an error is counted and logged, and the loop
//! moves on, so one poisoned record cannot sink a run. Side effects commit
//! immediately per item, which is what makes an external scheduler cutoff
//! safe — everything processed so far is durable, the rest stays in the
//! backlog for the next invocation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::resolve::orchestrator::Resolver;
use crate::resolve::rate_limit::RateLimiter;
use crate::resolve::store::{Backlog, CatalogItem, IdentityStore};
use crate::resolve::validator::validate_and_split;
use crate::resolve::variants::generate_variants;

/// Per-run counters. Scoped to one invocation, returned in the job response,
/// never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_processed: u64,
    pub wiki_hits: u64,
    pub performers_added: u64,
    pub errors: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchOptions {
    pub limit: i64,
    pub offset: i64,
    pub source_filter: Option<String>,
}

/// Outcome of one batch invocation. `error` is set when the run aborted
/// outside the per-item boundary; the stats accumulated up to that point are
/// kept either way.
#[derive(Debug)]
pub struct JobReport {
    pub stats: RunStats,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Everything the pipeline needs, wired once and passed down. No global
/// state: tests assemble the same struct from fakes.
pub struct ResolveContext {
    pub backlog: Arc<dyn Backlog>,
    pub identities: Arc<dyn IdentityStore>,
    pub resolver: Resolver,
    pub limiter: Arc<RateLimiter>,
}

pub async fn run_backlog(ctx: &ResolveContext, opts: &BatchOptions) -> JobReport {
    let started = Instant::now();
    let mut stats = RunStats::default();

    let items = match ctx
        .backlog
        .list_unresolved_items(opts.limit, opts.offset, opts.source_filter.as_deref())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "backlog query failed; aborting run");
            return JobReport {
                stats,
                duration: started.elapsed(),
                error: Some(e.to_string()),
            };
        }
    };

    info!(
        count = items.len(),
        limit = opts.limit,
        offset = opts.offset,
        source_filter = ?opts.source_filter,
        "starting resolution batch"
    );

    for item in &items {
        stats.total_processed += 1;
        if let Err(e) = process_item(ctx, item, &mut stats).await {
            error!(item_id = item.id, error = %e, "item failed; continuing");
            stats.errors += 1;
        }
        // One mandatory pacing step per item, hit or miss, so backlog sweeps
        // stay slow even when every answer comes from the cache.
        ctx.limiter.wait_turn().await;
    }

    info!(
        total = stats.total_processed,
        hits = stats.wiki_hits,
        added = stats.performers_added,
        errors = stats.errors,
        skipped = stats.skipped,
        "resolution batch finished"
    );

    JobReport {
        stats,
        duration: started.elapsed(),
        error: None,
    }
}

async fn process_item(
    ctx: &ResolveContext,
    item: &CatalogItem,
    stats: &mut RunStats,
) -> Result<()> {
    let variants = generate_variants(&item.normalized_code, item.original_code.as_deref());
    if variants.is_empty() {
        stats.skipped += 1;
        info!(item_id = item.id, code = %item.normalized_code, "no code variants; skipped");
        return Ok(());
    }

    let Some(resolution) = ctx.resolver.resolve(item, &variants).await? else {
        return Ok(());
    };
    stats.wiki_hits += 1;

    for raw in &resolution.names {
        for name in validate_and_split(raw) {
            let performer_id = ctx.identities.upsert_performer(&name).await?;
            ctx.identities.link_performer(item.id, performer_id).await?;
            stats.performers_added += 1;
        }
    }

    info!(
        item_id = item.id,
        source = %resolution.source,
        names = resolution.names.len(),
        "item resolved"
    );
    Ok(())
}
