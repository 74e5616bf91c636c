//! Layout theme: every constant the geometry, flow and emission stages read.
//!
//! All lengths are millimetres. Colours are 6-digit RGB hex strings without `#`.
//! The theme is built once at startup and shared read-only across requests.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Theme types
// ────────────────────────────────────────────────────────────────────────────

/// Fixed bands and margins of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Applied on all four sides.
    pub margin_mm: f32,
    /// Gap between info bar and body, and between body and footer.
    pub band_gap_mm: f32,
    pub header_height_mm: f32,
    pub info_height_mm: f32,
    pub footer_height_mm: f32,
}

/// Heuristics used by the flow planner inside the body zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Inset between the body background and its content, all four sides.
    pub body_inset_mm: f32,
    pub group_gap_mm: f32,
    pub per_line_mm: f32,
    pub line_padding_mm: f32,
    pub intro_min_mm: f32,
    /// Intro may take at most this fraction of the inner body height.
    pub intro_max_fraction: f32,
    pub divider_height_mm: f32,
    pub table_row_mm: f32,
    pub table_header_padding_mm: f32,
    pub table_gap_mm: f32,
    pub label_column_mm: f32,
    /// Footer note is only placed when more than this much height is left.
    pub footer_residual_mm: f32,
    pub footer_label_mm: f32,
    pub footer_label_gap_mm: f32,
    pub footer_min_mm: f32,
    pub footer_text_inset_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub accent: String,
    pub text: String,
    pub on_primary: String,
    pub body_fill: String,
    pub outline: String,
    pub table_header_fill: String,
    pub table_cell_fill: String,
    pub note_fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_face: String,
    pub header_pt: f32,
    pub info_pt: f32,
    pub footer_pt: f32,
    pub general_body_pt: f32,
    pub result_body_pt: f32,
    /// Intro, divider and footer-note text of the result variant.
    pub prose_pt: f32,
    /// Line spacing = round(body size × factor) points.
    pub line_spacing_factor: f32,
    pub paragraph_after_pt: f32,
    pub body_outline_pt: f32,
    pub table_border_pt: f32,
}

/// The complete, immutable layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTheme {
    pub page: PageMetrics,
    pub flow: FlowMetrics,
    pub palette: Palette,
    pub typography: Typography,
}

pub const DEFAULT_FONT: &str = "Malgun Gothic";

/// Returns the A4 portrait theme used for both notice variants.
pub fn default_a4_theme(font_face: &str) -> LayoutTheme {
    LayoutTheme {
        page: PageMetrics {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 12.0,
            band_gap_mm: 4.0,
            header_height_mm: 18.0,
            info_height_mm: 12.0,
            footer_height_mm: 16.0,
        },
        flow: FlowMetrics {
            body_inset_mm: 4.0,
            group_gap_mm: 3.0,
            per_line_mm: 8.0,
            line_padding_mm: 8.0,
            intro_min_mm: 18.0,
            intro_max_fraction: 0.3,
            divider_height_mm: 8.0,
            table_row_mm: 12.0,
            table_header_padding_mm: 18.0,
            table_gap_mm: 4.0,
            label_column_mm: 38.0,
            footer_residual_mm: 10.0,
            footer_label_mm: 6.0,
            footer_label_gap_mm: 2.0,
            footer_min_mm: 24.0,
            footer_text_inset_mm: 2.0,
        },
        palette: Palette {
            primary: "1E73C8".to_string(),
            accent: "0C4A99".to_string(),
            text: "1D1D1F".to_string(),
            on_primary: "FFFFFF".to_string(),
            body_fill: "F5F8FD".to_string(),
            outline: "CDD9E7".to_string(),
            table_header_fill: "E8EDF5".to_string(),
            table_cell_fill: "FFFFFF".to_string(),
            note_fill: "F7F9FC".to_string(),
        },
        typography: Typography {
            font_face: font_face.to_string(),
            header_pt: 20.0,
            info_pt: 10.0,
            footer_pt: 18.0,
            general_body_pt: 15.0,
            result_body_pt: 13.0,
            prose_pt: 14.0,
            line_spacing_factor: 1.45,
            paragraph_after_pt: 3.0,
            body_outline_pt: 0.75,
            table_border_pt: 1.0,
        },
    }
}

impl Typography {
    /// Line spacing in whole points for the given base font size.
    pub fn line_spacing_pt(&self, base_pt: f32) -> f32 {
        (base_pt * self.line_spacing_factor).round()
    }
}
