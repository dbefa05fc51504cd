//! JSON request body extractor
//!
//! Unlike `axum::Json` this ignores the request content type and reports
//! every parse failure as a 400 with the same message. Bodies over the
//! router's size limit are a 413.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const BODY_TOO_LARGE: &str = "Request body too large";

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
            } else {
                ApiError::validation("Could not read request body")
            }
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            ApiError::validation(INVALID_JSON)
        })
    }
}
