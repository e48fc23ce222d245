//! # filmoteca-rs
//!
//! Server-rendered film catalogue with an admin editor and role-based accounts.
//!
//! ## Architecture
//!
//! - **Catalogue**: CRUD over the `catalogo` table, listings prepared for display
//! - **Accounts**: registration and login over `usuarios`, Argon2id password hashes
//! - **Identifiers**: random 5-digit ids claimed by insert, redrawn on collision
//! - **HTTP**: Axum router with server-rendered pages, rate limiting, request IDs,
//!   and graceful shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod accounts;
mod catalogue;
mod config;
mod db;
mod http;
mod ids;
mod views;

use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Cli};
use crate::http::{router, AppState};
use crate::ids::RandomIds;
use crate::views::Views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        database = %config.database.url,
        max_connections = config.database.max_connections,
        auto_migrate = config.auto_migrate,
        static_dir = ?config.static_dir.as_ref().map(|path| path.display().to_string()),
        "configuration loaded"
    );

    let pool = db::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    if config.auto_migrate {
        db::migrate(&pool)
            .await
            .context("failed to prepare database schema")?;
    }

    let views = Views::new().context("failed to load page templates")?;
    let mut state = AppState::new(pool.clone(), Arc::new(RandomIds), views, &config.image_prefix);
    state.static_dir = config.static_dir;
    state.rate_limit = config.rate_limit;

    let app = router(state)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "filmoteca-rs listening");

    serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")?;

    pool.close().await;
    Ok(())
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
