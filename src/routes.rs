use std::time::Instant;

use axum::{
    extract::{Query, Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::ServiceMode;
use crate::handlers::{self, ApiError};
use crate::state::AppState;
use crate::translate::engine::EngineState;

const DEFAULT_LOG_LINES: usize = 100;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new().route("/health", get(health_check));

    let router = match state.config.system_config.service_mode {
        ServiceMode::Standard => router.route("/translate", post(handlers::translate)),
        ServiceMode::Cached => router
            .route("/translate", post(handlers::translate_cached))
            .route("/logs", get(get_logs))
            .layer(middleware::from_fn(request_timing)),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let engine_state = state.engine.state().await;
    let mut body = json!({
        "status": "ok",
        "model_loaded": matches!(engine_state, EngineState::Ready { .. }),
        "engine_state": engine_state.label(),
    });

    match &engine_state {
        EngineState::Ready { device, loaded_at } => {
            body["device"] = json!(device);
            body["loaded_at"] = json!(loaded_at.to_rfc3339());
        }
        EngineState::Failed { reason } => {
            body["error"] = json!(reason);
        }
        _ => {}
    }

    if state.config.system_config.service_mode == ServiceMode::Cached {
        let stats = state.cache.stats().await;
        body["cache"] = json!({
            "hits": stats.hits,
            "misses": stats.misses,
            "size": stats.len,
            "capacity": stats.capacity,
        });
    }

    Json(body)
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    lines: Option<usize>,
}

/// Tail of the server log file.
async fn get_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Value>, ApiError> {
    let lines = query.lines.unwrap_or(DEFAULT_LOG_LINES);

    if !state.log_file.exists() {
        return Ok(Json(json!({"logs": ["No logs available yet."]})));
    }

    let content = tokio::fs::read_to_string(&state.log_file)
        .await
        .map_err(|e| {
            error!("Failed to fetch logs: {}", e);
            ApiError::Logs
        })?;

    // lines=0 returns the whole file
    let all: Vec<&str> = content.lines().collect();
    let start = match lines {
        0 => 0,
        n => all.len().saturating_sub(n),
    };
    let tail = &all[start..];
    Ok(Json(json!({ "logs": tail })))
}

/// Log every request with its status and duration and expose the duration as a header.
async fn request_timing(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = Uuid::new_v4();
    info!("Request: {} {} [{}]", method, uri, request_id);

    let mut response = next.run(request).await;

    let process_time = start.elapsed().as_secs_f64();
    info!(
        "Response: {} {} - Status: {} - Time: {:.2}s [{}]",
        method,
        uri,
        response.status().as_u16(),
        process_time,
        request_id
    );

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&process_time.to_string()) {
        headers.insert("x-process-time", value);
    }
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        headers.insert("x-request-id", value);
    }
    response
}
