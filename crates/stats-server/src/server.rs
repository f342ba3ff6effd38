//! HTTP front end for the cached stats engine

use axum::{
    extract::{Query, State},
    http::{HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use stats_cache::CacheStatsSnapshot;
use stats_core::{QueryParams, StatsResult};
use stats_engine::CachedStatsEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Response header carrying `HIT` or `MISS`
pub static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared application state
pub struct AppState {
    pub engine: CachedStatsEngine,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: StatsResult,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub enabled: bool,
    pub capacity: usize,
    #[serde(flatten)]
    pub stats: CacheStatsSnapshot,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Aggregate statistics for the requested filters
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Response {
    // Scans and waits on in-flight computations stay off the async workers
    let query = params.clone();
    let outcome = tokio::task::spawn_blocking(move || state.engine.query(&query)).await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(?params, error = %err, "Stats query task failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Task join error: {}", err),
            );
        }
    };

    match outcome {
        Ok((stats, status)) => (
            [(X_CACHE.clone(), status.as_str())],
            Json(StatsResponse { stats }),
        )
            .into_response(),
        Err(err) if err.is_client_error() => {
            warn!(?params, error = %err, "Rejected stats query");
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err) => {
            error!(?params, error = %err, "Stats query failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        rows: state.engine.dataset().num_rows(),
    })
}

/// Cache counters
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let cache = state.engine.cache();
    Json(CacheStatsResponse {
        enabled: cache.is_enabled(),
        capacity: cache.capacity(),
        stats: cache.stats().snapshot(),
    })
}

/// Build the router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/health", get(health))
        .route("/cache/stats", get(cache_stats))
        .with_state(state)
}

/// Serve until Ctrl+C or SIGTERM
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use chrono::NaiveDate;
    use serde_json::Value;
    use stats_cache::CacheConfig;
    use stats_storage::{Dataset, MemoryDataSource, Reading};

    fn state() -> Arc<AppState> {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let source = MemoryDataSource::from_readings(&[
            Reading::new("A", "T", day(1), 10.0),
            Reading::new("A", "T", day(2), 20.0),
        ])
        .unwrap();
        let dataset = Arc::new(Dataset::load(&source).unwrap());
        Arc::new(AppState {
            engine: CachedStatsEngine::new(dataset, CacheConfig::default()),
        })
    }

    async fn call(
        state: &Arc<AppState>,
        params: QueryParams,
    ) -> (StatusCode, Option<String>, Value) {
        let response = get_stats(State(Arc::clone(state)), Query(params)).await;
        let status = response.status();
        let cache = response
            .headers()
            .get(&X_CACHE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_stats_miss_then_hit() {
        let state = state();
        let params = QueryParams::new().with_location("A").with_sensor("T");

        let (status, cache, body) = call(&state, params.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(
            body,
            serde_json::json!({"stats": {"count": 2, "avg": 15.0, "min": 10.0, "max": 20.0}})
        );

        let (_, cache, _) = call(&state, params).await;
        assert_eq!(cache.as_deref(), Some("HIT"));
    }

    #[tokio::test]
    async fn test_stats_no_match() {
        let state = state();
        let (status, cache, body) = call(&state, QueryParams::new().with_location("Z")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(body["stats"]["count"], 0);
        assert!(body["stats"]["avg"].is_null());
    }

    #[tokio::test]
    async fn test_bad_date_is_bad_request() {
        let state = state();
        let params = QueryParams::new().with_start_date("tomorrow");

        for _ in 0..2 {
            let (status, cache, body) = call(&state, params.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(cache.is_none());
            assert!(body["error"].as_str().unwrap().contains("start_date"));
        }
    }

    #[tokio::test]
    async fn test_cache_stats_endpoint() {
        let state = state();
        call(&state, QueryParams::new()).await;
        call(&state, QueryParams::new()).await;

        let Json(response) = cache_stats(State(Arc::clone(&state))).await;
        assert!(response.enabled);
        assert_eq!(response.capacity, 512);
        assert_eq!(response.stats.hits, 1);
        assert_eq!(response.stats.misses, 1);
        assert_eq!(response.stats.entry_count, 1);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(response) = health(State(state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.rows, 2);
    }

    async fn request(router: &Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get(&X_CACHE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_router_empty_param_is_own_key() {
        let state = state();
        let router = build_router(Arc::clone(&state));

        let (status, cache, absent) = request(&router, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));

        // Same rows as the unfiltered query, but a different cache key
        let (_, cache, empty) = request(&router, "/stats?location=").await;
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(empty, absent);
        assert_eq!(empty["stats"]["count"], 2);

        let (_, cache, _) = request(&router, "/stats?location=").await;
        assert_eq!(cache.as_deref(), Some("HIT"));
        assert_eq!(state.engine.cache_size(), 2);
    }

    #[tokio::test]
    async fn test_router_query_string_filters() {
        let router = build_router(state());

        let (status, cache, body) =
            request(&router, "/stats?location=A&sensor=T&end_date=2024-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(
            body,
            serde_json::json!({"stats": {"count": 1, "avg": 10.0, "min": 10.0, "max": 10.0}})
        );

        let (status, cache, body) = request(&router, "/stats?end_date=not-a-date").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(cache.is_none());
        assert!(body["error"].as_str().unwrap().contains("end_date"));
    }

    #[tokio::test]
    async fn test_router_health() {
        let router = build_router(state());
        let (status, _, body) = request(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["rows"], 2);
    }
}
