//! # threads
//!
//! Entry point: loads configuration, opens the database, wires the adapters
//! into the services and serves pages until interrupted.

#[cfg(not(all(feature = "web-axum", feature = "db-sqlite", feature = "auth-jwt")))]
compile_error!("the threads binary needs the web-axum, db-sqlite and auth-jwt features");

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState, FeedSettings};
use auth_adapters::JwtIdentityGateway;
use configs::AppConfig;
use domains::{IdentityGateway, ThreadRepository, UserRepository, ViewInvalidator};
use secrecy::ExposeSecret;
use services::{PageAccess, ThreadService, UserService};
use storage_adapters::{sqlite::Database, PageCache};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(config.log.json);

    // 1. Database: one handle for the life of the process
    let db = Database::connect(
        config.database.url.expose_secret(),
        config.database.max_connections,
    )
    .await
    .context("opening database")?;

    // 2. Adapters
    let users: Arc<dyn UserRepository> = Arc::new(db.users());
    let threads: Arc<dyn ThreadRepository> = Arc::new(db.threads());
    let cache = Arc::new(PageCache::new());
    let views: Arc<dyn ViewInvalidator> = cache.clone();
    let identity: Arc<dyn IdentityGateway> = Arc::new(JwtIdentityGateway::new(
        config.auth.jwt_secret.expose_secret().as_bytes(),
        config.auth.issuer.as_deref(),
    ));

    // 3. Services
    let state = AppState {
        users: Arc::new(UserService::new(users.clone(), threads.clone(), views.clone())),
        threads: Arc::new(ThreadService::new(users.clone(), threads, views)),
        access: Arc::new(PageAccess::new(identity, users)),
        cache,
        feed: FeedSettings {
            page_size: config.feed.page_size,
            users_page_size: config.feed.users_page_size,
        },
    };

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "threads listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    db.close().await;
    info!("shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
