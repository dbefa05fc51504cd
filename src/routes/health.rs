use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub store: String,
    pub cache: String,
}

/// Health check endpoint - public
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let store_result = state.store.health_check().await;
    let cache_status = match &state.cache {
        Some(cache) => match cache.health_check().await {
            Ok(()) => "ok",
            Err(_) => "error",
        },
        None => "disabled",
    };

    let store_status = if store_result.is_ok() { "ok" } else { "error" };

    // The store is critical; the cache only degrades reads
    let status = match (store_result.is_ok(), cache_status) {
        (false, _) => "unhealthy",
        (true, "error") => "degraded",
        (true, _) => "healthy",
    };

    let status_code = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                store: store_status.to_string(),
                cache: cache_status.to_string(),
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use std::sync::Arc;

    use crate::app::test_support::{app_with_store, memory_app, send};
    use crate::services::profiles::tests::BrokenStore;

    #[tokio::test]
    async fn healthy_with_memory_store_and_no_cache() {
        let (status, body) = send(&memory_app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["store"], "ok");
        assert_eq!(body["services"]["cache"], "disabled");
    }

    #[tokio::test]
    async fn unhealthy_when_store_is_down() {
        let app = app_with_store(Arc::new(BrokenStore));
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }
}
