use std::sync::Arc;

use anyhow::{Context, Result};

use cast_resolver::api::server::ApiServer;
use cast_resolver::db::Db;
use cast_resolver::logging::init_tracing;
use cast_resolver::resolve::batch::ResolveContext;
use cast_resolver::util::env as env_util;

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("info,sqlx=warn")?;

    let database_url = env_util::db_url().context("database URL not configured")?;
    let max_conns: u32 = env_util::env_parse("DB_MAX_CONNS", 5u32);
    let db = Db::connect(&database_url, max_conns)
        .await
        .context("Db::connect failed")?;

    // The batch itself stays single-threaded; a small pool only covers the
    // API handlers running next to an in-flight job.
    let ctx = Arc::new(ResolveContext::from_env(db.clone())?);

    let server = ApiServer::from_env()?;
    server.run(db, ctx).await
}
