use std::sync::Arc;

use crate::content::ContentSource;
use crate::layout::LayoutTheme;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup and never mutated; every render reads the same theme.
    pub theme: Arc<LayoutTheme>,
    /// Collaborator answering `POST /api/v1/content`. Default: `LlmClient`.
    pub content_source: Arc<dyn ContentSource>,
}
