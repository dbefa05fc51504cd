pub mod health;
pub mod items;
pub mod profiles;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Profiles
        .route(
            "/profiles",
            get(profiles::missing_user_id)
                .post(profiles::create_profile)
                .put(profiles::missing_user_id)
                .patch(profiles::missing_user_id),
        )
        .route(
            "/profiles/",
            get(profiles::missing_user_id)
                .put(profiles::missing_user_id)
                .patch(profiles::missing_user_id),
        )
        .route(
            "/profiles/:user_id",
            get(profiles::get_profile)
                .put(profiles::update_profile)
                .patch(profiles::update_profile),
        )
        // Generic items
        .route("/items", get(items::list_items).post(items::create_item))
}
