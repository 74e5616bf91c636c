//! Page geometry: derives the fixed bands and the adaptive body zone from the theme.
//!
//! Vertical stack, top to bottom:
//! ```text
//! margin | header | info | gap | body (remainder) | gap | footer | margin
//! ```
//! The body is never a fixed height; it absorbs all slack between the bands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::theme::PageMetrics;

/// An axis-aligned rectangle on the page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Zone {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrinks the zone by `inset` on every side. A zone too small for the inset
    /// collapses to its centre line rather than growing past its own edges.
    pub fn inset(&self, inset: f32) -> Zone {
        let dx = inset.min(self.width / 2.0);
        let dy = inset.min(self.height / 2.0);
        Zone {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width - dx * 2.0,
            height: self.height - dy * 2.0,
        }
    }
}

#[cfg(test)]
impl Zone {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// True if `other` lies entirely inside `self` (edges may touch).
    pub fn contains(&self, other: &Zone) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("fixed bands and margins exceed the page height (body height {body_height:.2}mm)")]
    NegativeBody { body_height: f32 },

    #[error("margins exceed the page width (inner width {inner_width:.2}mm)")]
    NegativeWidth { inner_width: f32 },
}

/// The named zones of a single notice page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub header: Zone,
    pub info: Zone,
    pub body: Zone,
    pub footer: Zone,
}

/// Computes the page zones. Fails if the fixed bands do not fit the page;
/// callers treat that as a configuration error, not a render-time condition.
pub fn compute_geometry(page: &PageMetrics) -> Result<PageGeometry, GeometryError> {
    let inner_width = page.width_mm - page.margin_mm * 2.0;
    if inner_width < 0.0 {
        return Err(GeometryError::NegativeWidth { inner_width });
    }

    let header_top = page.margin_mm;
    let info_top = header_top + page.header_height_mm;
    let body_top = info_top + page.info_height_mm + page.band_gap_mm;
    let footer_top = page.height_mm - page.margin_mm - page.footer_height_mm;
    let body_height = footer_top - page.band_gap_mm - body_top;

    if body_height < 0.0 {
        return Err(GeometryError::NegativeBody { body_height });
    }

    let x = page.margin_mm;
    Ok(PageGeometry {
        page_width: page.width_mm,
        page_height: page.height_mm,
        header: Zone::new(x, header_top, inner_width, page.header_height_mm),
        info: Zone::new(x, info_top, inner_width, page.info_height_mm),
        body: Zone::new(x, body_top, inner_width, body_height),
        footer: Zone::new(x, footer_top, inner_width, page.footer_height_mm),
    })
}
