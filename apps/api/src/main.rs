mod config;
mod content;
mod errors;
mod layout;
mod llm_client;
mod notice;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::{compute_geometry, default_a4_theme};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting noticeboard API v{}", env!("CARGO_PKG_VERSION"));

    // Layout theme: a page that cannot be laid out is a startup failure
    let theme = default_a4_theme(&config.notice_font);
    let geometry = compute_geometry(&theme.page).context("Invalid layout theme")?;
    info!(
        "Layout theme: {}x{}mm, body {:.1}mm tall, font {}",
        geometry.page_width, geometry.page_height, geometry.body.height, theme.typography.font_face
    );

    // Initialize content collaborator
    let llm = LlmClient::new(config.openai_api_key.clone())?;
    if llm.has_api_key() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("OPENAI_API_KEY not set; /api/v1/content will reject every request");
    }

    let state = AppState {
        theme: Arc::new(theme),
        content_source: Arc::new(llm),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
