// src/master/metrics_server.rs

use crate::core::metrics::gather_metrics;
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use std::net::SocketAddr;
use tracing::info;

async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Runs a simple HTTP server exposing Prometheus metrics on `/metrics`,
/// grounded on the teacher's `server::metrics_server::run_metrics_server`.
pub async fn run_metrics_server(host: String, port: u16) -> anyhow::Result<()> {
    let app = Router::new().route("/metrics", get(metrics_handler));
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "metrics server listening on /metrics");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
