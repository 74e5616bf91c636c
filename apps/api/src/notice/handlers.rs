use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::notice::{NoticeRequest, RenderPayload};
use crate::render::{render_notice_pptx, PPTX_CONTENT_TYPE};
use crate::routes::parse_json_body;
use crate::state::AppState;

/// POST /api/v1/notices/render
/// Renders one A4 notice and returns it as a PPTX download.
pub async fn handle_render_notice(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: RenderPayload = parse_json_body(&body)?;
    let request = NoticeRequest::from_payload(payload);
    let render_id = Uuid::new_v4();

    info!(%render_id, variant = ?request.variant, lines = request.body_lines.len(), "Render started");

    let theme = state.theme.clone();
    let filename = request.variant.download_name();
    let bytes = tokio::task::spawn_blocking(move || render_notice_pptx(&request, &theme))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    info!(%render_id, bytes = bytes.len(), "Render finished");

    let disposition = HeaderValue::from_bytes(format!("attachment; filename=\"{filename}\"").as_bytes())
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PPTX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
