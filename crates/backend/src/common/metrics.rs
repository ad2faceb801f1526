use std::{
    future,
    time::{Duration, Instant},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::IntoResponse,
    routing,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use sysinfo::System;
use tokio::task::JoinHandle;

use super::AppState;
use crate::gallery;

pub async fn track_http(req: Request, next: Next) -> impl IntoResponse {
    let start = Instant::now();
    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };
    let method = req.method().clone();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_requests_duration_seconds", &labels).record(latency);

    response
}

pub fn prometheus_router() -> anyhow::Result<Router> {
    let recorder_handle = setup_metrics_recorder()?;
    Ok(Router::new().route(
        "/metrics",
        routing::get(move || future::ready(recorder_handle.render())),
    ))
}

fn setup_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_requests_duration_seconds".to_string()),
            EXPONENTIAL_SECONDS,
        )?
        .install_recorder()?;
    Ok(handle)
}

/// Periodically publish gallery size, live sessions and process host stats as gauges.
pub fn spawn_system_metrics(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sys = System::new();
        let mut ticker = tokio::time::interval(every);

        loop {
            ticker.tick().await;

            sys.refresh_memory();
            sys.refresh_cpu_usage();
            metrics::gauge!("system_memory_used_bytes").set(sys.used_memory() as f64);
            metrics::gauge!("system_cpu_usage_percent").set(sys.global_cpu_usage() as f64);

            let gallery_dir = state.paths.gallery_dir.clone();
            match tokio::task::spawn_blocking(move || gallery::count_gallery_files(&gallery_dir))
                .await
            {
                Ok(n) => metrics::gauge!("gallery_images").set(n as f64),
                Err(e) => tracing::warn!("gallery count task failed: {e}"),
            }

            match state.repo.count_active_sessions().await {
                Ok(n) => metrics::gauge!("admin_sessions_active").set(n as f64),
                Err(e) => tracing::warn!("session count failed: {e:#}"),
            }
        }
    })
}
