//! Rendering interface and the notice render pipeline.
//!
//! `DocumentRenderer` is the seam to the document encoder. The pipeline in
//! [`render_notice`] runs geometry → classification → flow planning → emission
//! strictly in sequence; the first error aborts the request with no partial output.

pub mod emission;
pub mod pptx;
mod pptx_parts;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::{
    classify_result_body, compute_geometry, flatten_general_body, plan_general_flow,
    plan_result_flow, FlowPlan, GeometryError, LayoutTheme, PageGeometry, Zone,
};
use crate::notice::{NoticeRequest, Variant, BODY_PLACEHOLDER};

pub use pptx::PptxRenderer;

pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectStyle {
    pub fill: String,
    /// `None` draws no outline.
    pub line_color: Option<String>,
    pub line_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_face: String,
    pub size_pt: f32,
    pub color: String,
    pub bold: bool,
    pub align: HAlign,
    pub valign: VAlign,
    pub line_spacing_pt: Option<f32>,
    pub paragraph_after_pt: Option<f32>,
    /// Let the viewer shrink the text until it fits the zone.
    pub shrink_to_fit: bool,
    pub wrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    pub font_face: String,
    pub size_pt: f32,
    pub color: String,
    pub header_fill: String,
    pub cell_fill: String,
    pub border_color: String,
    pub border_pt: f32,
    /// Header row and first column are set in bold.
    pub bold_header: bool,
    pub bold_first_column: bool,
    pub cell_margin_pt: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer seam
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("package write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML formatting failed: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("no page has been started")]
    NoPage,

    #[error("table row {row} has {found} cells, expected {expected}")]
    RaggedTable {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Draw operations the notice layout needs from a document encoder.
/// Coordinates and sizes are millimetres from the page's top-left corner.
pub trait DocumentRenderer {
    fn begin_page(&mut self, width_mm: f32, height_mm: f32) -> Result<(), RenderError>;

    fn draw_rect(&mut self, zone: &Zone, style: &RectStyle) -> Result<(), RenderError>;

    fn draw_text(&mut self, zone: &Zone, text: &str, style: &TextStyle) -> Result<(), RenderError>;

    /// `rows[0]` is the header row. `column_widths_mm` must sum to `zone.width`.
    fn draw_table(
        &mut self,
        zone: &Zone,
        rows: &[Vec<String>],
        column_widths_mm: &[f32],
        style: &TableStyle,
    ) -> Result<(), RenderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NoticeRenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Classifies the body and plans its flow inside the body zone.
pub fn plan_notice(request: &NoticeRequest, geometry: &PageGeometry, theme: &LayoutTheme) -> FlowPlan {
    match request.variant {
        Variant::General => {
            let block = flatten_general_body(&request.body_lines, BODY_PLACEHOLDER);
            plan_general_flow(&geometry.body, block, &theme.flow)
        }
        Variant::Result => {
            let groups = classify_result_body(&request.body_lines).into_groups();
            plan_result_flow(&geometry.body, groups, &theme.flow)
        }
    }
}

/// Runs the full pipeline against `renderer`. The caller finishes the document.
pub fn render_notice<R: DocumentRenderer>(
    request: &NoticeRequest,
    theme: &LayoutTheme,
    renderer: &mut R,
) -> Result<FlowPlan, NoticeRenderError> {
    let geometry = compute_geometry(&theme.page)?;
    let plan = plan_notice(request, &geometry, theme);

    debug!(
        variant = ?request.variant,
        groups = plan.placements.len(),
        table_clipped = plan.table_clipped,
        footer_dropped = plan.footer_dropped,
        "Notice planned"
    );

    emission::emit_notice(request, &geometry, &plan, theme, renderer)?;
    Ok(plan)
}

/// Renders a notice straight to PPTX bytes.
pub fn render_notice_pptx(
    request: &NoticeRequest,
    theme: &LayoutTheme,
) -> Result<Vec<u8>, NoticeRenderError> {
    let mut renderer =
        PptxRenderer::new(chrono::Utc::now(), theme.palette.clone()).with_title(&request.title);
    render_notice(request, theme, &mut renderer)?;
    Ok(renderer.finish()?)
}
