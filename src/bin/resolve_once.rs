//! One-shot batch runner for cron jobs and manual backfills.
//!
//! Reads the same configuration as the service and prints the job report as
//! JSON on stdout. Exit code is non-zero only on a top-level failure; items
//! that fail individually are reported in the stats.

use anyhow::{Context, Result};

use cast_resolver::db::Db;
use cast_resolver::logging::init_tracing;
use cast_resolver::resolve::batch::{run_backlog, BatchOptions, ResolveContext};
use cast_resolver::util::env as env_util;

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("info,sqlx=warn")?;

    let database_url = env_util::db_url().context("database URL not configured")?;
    let db = Db::connect(&database_url, 2)
        .await
        .context("Db::connect failed")?;

    let ctx = ResolveContext::from_env(db)?;
    let opts = BatchOptions {
        limit: env_util::env_parse("RESOLVE_LIMIT", 50i64),
        offset: env_util::env_parse("RESOLVE_OFFSET", 0i64),
        source_filter: env_util::env_opt("RESOLVE_SOURCE_FILTER"),
    };

    let report = run_backlog(&ctx, &opts).await;
    println!(
        "{}",
        serde_json::json!({
            "stats": report.stats,
            "duration_seconds": report.duration.as_secs_f64(),
            "error": report.error,
        })
    );

    if let Some(err) = report.error {
        anyhow::bail!("resolution run aborted: {err}");
    }
    Ok(())
}
