use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::extract::Request;
use password_hash::PasswordHash;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::{net::TcpListener, sync::Notify};
use tower_http::trace::{DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use libs::{site_settings::SharedSettings, util};

use backend::{
    CONFIG, app,
    common::{AppState, metrics},
    db::Repository,
    news::NewsBoard,
};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .init();

    PasswordHash::new(&CONFIG.admin_password_hash)
        .map_err(|e| anyhow::anyhow!("ADMIN_PASSWORD_HASH is not a PHC string: {e}"))?;

    let settings = SharedSettings::load(&CONFIG.backend_settings_file)
        .with_context(|| format!("loading {}", CONFIG.backend_settings_file))?;
    let manager = SqliteConnectionManager::file(&CONFIG.backend_db_file);
    let pool = r2d2::Pool::builder().max_size(4).build(manager)?;
    let repo = Repository::new(pool);
    repo.init_schema()?;

    let state = AppState {
        repo: Arc::new(repo),
        settings,
        news: Arc::new(NewsBoard::from_bundled()?),
        paths: Arc::new(CONFIG.site_paths()),
        upload: CONFIG.upload_policy(),
        auth: Arc::new(CONFIG.admin_auth()),
    };

    let api_router = app::router(state.clone(), CONFIG.upload_max_bytes).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    client_ip = %req.headers().get("x-forwarded-for").and_then(|h| h.to_str().ok())
                    .unwrap_or("unknown"),
                )
            })
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::INFO)),
    );
    let metrics_router = metrics::prometheus_router()?;

    metrics::spawn_system_metrics(
        state.clone(),
        Duration::from_secs(CONFIG.prometheus_refresh_interval.max(1)),
    );
    spawn_session_purge(state.repo.clone());

    let shutdown_notify = Arc::new(Notify::new());
    tokio::spawn(util::listen_for_shutdown(shutdown_notify.clone()));

    let api_listener = TcpListener::bind((
        CONFIG.backend_ipv4_address.as_str(),
        CONFIG.backend_port,
    ))
    .await?;
    let metrics_listener = TcpListener::bind((
        CONFIG.prometheus_ipv4_address.as_str(),
        CONFIG.prometheus_port,
    ))
    .await?;

    tracing::info!("⇢ Site listening on: http://{}", api_listener.local_addr()?);
    tracing::info!(
        "⇢ Metrics listening on: http://{}/metrics",
        metrics_listener.local_addr()?
    );
    tracing::info!("⇢ Serving {}", state.paths.public_dir.display());

    let api_server = axum::serve(api_listener, api_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });
    let metrics_server = axum::serve(metrics_listener, metrics_router).with_graceful_shutdown({
        let n = shutdown_notify.clone();
        async move { n.notified().await }
    });

    tokio::try_join!(api_server, metrics_server)?;

    Ok(())
}

fn spawn_session_purge(repo: Arc<Repository>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match repo.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("purged {n} expired admin session(s)"),
                Err(e) => tracing::warn!("session purge failed: {e:#}"),
            }
        }
    });
}
