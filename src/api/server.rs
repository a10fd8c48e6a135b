// API server implementation using actix-web

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

use crate::api::{auth, middleware, routes};
use crate::db::Db;
use crate::resolve::batch::ResolveContext;
use crate::util::env::{env_opt, env_parse, env_req};

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub api_secret: String,
    pub allowed_origins: String,
}

impl ApiServer {
    /// Create server from environment variables
    pub fn from_env() -> Result<Self> {
        crate::util::env::init_env();

        Ok(Self {
            host: env_opt("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse("API_PORT", 8080u16),
            api_secret: env_req("API_SECRET").context("API_SECRET is required")?,
            allowed_origins: env_opt("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        })
    }

    /// Start the HTTP server
    pub async fn run(self, db: Db, ctx: Arc<ResolveContext>) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            "starting cast-resolver API server"
        );

        let db_data = web::Data::new(db);
        let ctx_data = web::Data::new(ctx);
        let api_secret = self.api_secret.clone();
        let allowed_origins = self.allowed_origins.clone();

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);
            let auth = auth::Auth::new(api_secret.clone());

            App::new()
                .app_data(db_data.clone())
                .app_data(ctx_data.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .wrap(auth)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
