use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::middleware::request_id_layer;
use crate::routes;
use crate::services::{ItemService, ProfileCache, ProfileService, RedisCache};
use crate::store::SharedStore;

/// Request bodies above this size are rejected before parsing
pub(crate) const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub store: SharedStore,
    pub cache: Option<RedisCache>,
    pub profiles: ProfileService,
    pub items: ItemService,
}

impl AppState {
    pub fn new(settings: Settings, store: SharedStore, cache: Option<RedisCache>) -> Arc<Self> {
        let profile_cache = cache
            .clone()
            .map(|cache| Arc::new(cache) as Arc<dyn ProfileCache>);
        Arc::new(Self {
            profiles: ProfileService::new(store.clone(), profile_cache),
            items: ItemService::new(store.clone()),
            settings,
            store,
            cache,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    // No auth exists on any route, so cross-origin access defaults to open
    let origin = if settings.cors_allows_any() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_allow_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .max_age(max_age)
}
