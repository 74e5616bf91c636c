use axum::{extract::State, Json};
use bytes::Bytes;
use tracing::info;

use crate::content::{ContentRequest, ContentResponse, ContentTask};
use crate::errors::AppError;
use crate::routes::parse_json_body;
use crate::state::AppState;

/// POST /api/v1/content
pub async fn handle_content(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContentResponse>, AppError> {
    state.content_source.ready()?;

    let req: ContentRequest = parse_json_body(&body)?;
    let task = ContentTask::from_request(req)?;
    let mode = task.mode();

    let content = state.content_source.produce(task).await?;
    info!(mode, chars = content.chars().count(), "Content produced");

    Ok(Json(ContentResponse { content }))
}
