// HTTP request handlers for the resolution endpoints.

use std::sync::Arc;
use std::time::SystemTime;

use actix_web::{web, HttpResponse, Result};
use sqlx::Row;

use crate::api::models::*;
use crate::db::Db;
use crate::resolve::batch::{run_backlog, BatchOptions, ResolveContext};

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>) -> Result<HttpResponse> {
    let db_status = match sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(&db.pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let uptime = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: uptime,
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Run one resolution batch over the backlog. The scheduler calls this on a
/// timer; overlapping invocations are safe because every write upserts.
pub async fn run_resolution(
    payload: web::Json<ResolveRunRequest>,
    ctx: web::Data<Arc<ResolveContext>>,
) -> Result<HttpResponse> {
    tracing::info!(
        limit = payload.limit,
        offset = payload.offset,
        source_filter = ?payload.source_filter,
        "resolution run requested"
    );

    let opts = BatchOptions {
        limit: payload.limit,
        offset: payload.offset,
        source_filter: payload.source_filter.clone(),
    };
    let report = run_backlog(ctx.get_ref(), &opts).await;

    let body = ResolveRunResponse {
        stats: report.stats,
        duration_seconds: report.duration.as_secs_f64(),
    };

    match report.error {
        None => Ok(HttpResponse::Ok().json(ApiResponse::success(body))),
        Some(err) => {
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_with(body, err)))
        }
    }
}

/// Backlog counters for dashboards.
pub async fn resolve_stats(db: web::Data<Db>) -> Result<HttpResponse> {
    let row = sqlx::query(
        "SELECT
            (SELECT count(*) FROM catalog_items ci
             WHERE NOT EXISTS (SELECT 1 FROM item_performers ip WHERE ip.item_id = ci.id))
                AS unresolved_items,
            (SELECT count(*) FROM performers) AS performers,
            (SELECT count(*) FROM item_performers) AS links",
    )
    .fetch_one(&db.pool)
    .await;

    match row {
        Ok(row) => {
            let response = ApiResponse::success(BacklogStatsResponse {
                unresolved_items: row.get::<i64, _>("unresolved_items"),
                performers: row.get::<i64, _>("performers"),
                links: row.get::<i64, _>("links"),
            });
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            tracing::error!(error = %e, "stats query failed");
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<BacklogStatsResponse>::error(e.to_string())))
        }
    }
}
