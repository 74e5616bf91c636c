pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;

use crate::content::handlers as content;
use crate::errors::AppError;
use crate::notice::handlers as notice;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/notices/render", post(notice::handle_render_notice))
        .route("/api/v1/content", post(content::handle_content))
        .with_state(state)
}

/// Decodes a JSON request body. An empty body reads as `{}`.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {e}");
        AppError::Validation("Invalid JSON".to_string())
    })
}
