//! Generic item routes

use axum::{extract::State, Json};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::api::{Created, JsonBody};
use crate::app::AppState;
use crate::error::ApiResult;

/// POST /items
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Created<Map<String, Value>>> {
    let item = state.items.create(body).await?;
    Ok(Created(item))
}

/// GET /items
pub async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Map<String, Value>>>> {
    Ok(Json(state.items.list().await?))
}
