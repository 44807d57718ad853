use std::{future::Future, net::SocketAddr, time::Duration};

use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;

async fn healthcheck_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics_handler(State(metrics): State<Metrics>) -> Response {
    match metrics.encode() {
        Ok(buf) => {
            let headers: [(HeaderName, String); 1] =
                [(CONTENT_TYPE, TextEncoder::new().format_type().to_string())];
            (headers, Bytes::from(buf)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode prometheus metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {err}"),
        )
    }
}

/// Liveness and metrics routes. Liveness never consults the sensor.
pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_service_error))
                .layer(TraceLayer::new_for_http())
                .load_shed()
                .concurrency_limit(8)
                .timeout(Duration::from_secs(2)),
        )
}

/// Serve until `shutdown` resolves.
pub async fn run_server<F>(addr: SocketAddr, metrics: Metrics, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "http", addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(metrics).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!(target: "http", "server stopped");
    Ok(())
}
