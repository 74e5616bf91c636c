//! Render emission: translates the geometry and flow plan into draw calls.
//!
//! Fixed order: page, header bar, info bar, body background, each placement
//! top to bottom, footer bar. No layout decisions are made here.

use crate::layout::classifier::{ContentGroup, FOOTER_LABEL};
use crate::layout::{FlowPlan, LayoutTheme, PageGeometry, Placement, Zone};
use crate::notice::NoticeRequest;
use crate::render::{
    DocumentRenderer, HAlign, RectStyle, RenderError, TableStyle, TextStyle, VAlign,
};

const TABLE_HEADER: [&str; 2] = ["항목", "내용"];

pub fn emit_notice<R: DocumentRenderer>(
    request: &NoticeRequest,
    geometry: &PageGeometry,
    plan: &FlowPlan,
    theme: &LayoutTheme,
    renderer: &mut R,
) -> Result<(), RenderError> {
    let palette = &theme.palette;
    let typo = &theme.typography;

    renderer.begin_page(geometry.page_width, geometry.page_height)?;

    // header
    renderer.draw_rect(&geometry.header, &solid(&palette.primary))?;
    renderer.draw_text(
        &geometry.header,
        &request.title,
        &banner_text(theme, typo.header_pt, true),
    )?;

    // info bar
    renderer.draw_rect(&geometry.info, &solid(&palette.accent))?;
    renderer.draw_text(
        &geometry.info,
        &request.info_line(),
        &banner_text(theme, typo.info_pt, false),
    )?;

    // body background
    renderer.draw_rect(
        &geometry.body,
        &RectStyle {
            fill: palette.body_fill.clone(),
            line_color: Some(palette.outline.clone()),
            line_pt: typo.body_outline_pt,
        },
    )?;

    let base_pt = request.variant.base_font_pt(typo);
    for placement in &plan.placements {
        emit_placement(placement, base_pt, theme, renderer)?;
    }

    // footer
    renderer.draw_rect(&geometry.footer, &solid(&palette.primary))?;
    renderer.draw_text(
        &geometry.footer,
        &request.footer_text,
        &banner_text(theme, typo.footer_pt, true),
    )?;

    Ok(())
}

fn emit_placement<R: DocumentRenderer>(
    placement: &Placement,
    base_pt: f32,
    theme: &LayoutTheme,
    renderer: &mut R,
) -> Result<(), RenderError> {
    let typo = &theme.typography;
    let zone = &placement.zone;

    match &placement.group {
        ContentGroup::Intro(lines) => {
            renderer.draw_text(zone, &lines.join("\n"), &prose(theme, typo.prose_pt, base_pt))
        }
        ContentGroup::CenterDivider(text) => {
            let style = TextStyle {
                align: HAlign::Center,
                valign: VAlign::Middle,
                bold: true,
                line_spacing_pt: None,
                paragraph_after_pt: None,
                shrink_to_fit: false,
                ..prose(theme, typo.prose_pt, base_pt)
            };
            renderer.draw_text(zone, text, &style)
        }
        ContentGroup::TableRows(pairs) => {
            let mut rows = Vec::with_capacity(pairs.len() + 1);
            rows.push(TABLE_HEADER.iter().map(|s| s.to_string()).collect());
            rows.extend(pairs.iter().map(|(l, v)| vec![l.clone(), v.clone()]));

            let label_width = theme.flow.label_column_mm.min(zone.width);
            let widths = [label_width, zone.width - label_width];
            renderer.draw_table(zone, &rows, &widths, &table_style(theme, base_pt))
        }
        ContentGroup::FooterNote(lines) => {
            if let Some(caption) = &placement.caption {
                let style = TextStyle {
                    bold: true,
                    line_spacing_pt: None,
                    paragraph_after_pt: None,
                    shrink_to_fit: false,
                    wrap: false,
                    ..prose(theme, typo.prose_pt, base_pt)
                };
                renderer.draw_text(caption, FOOTER_LABEL, &style)?;
            }
            renderer.draw_rect(
                zone,
                &RectStyle {
                    fill: theme.palette.note_fill.clone(),
                    line_color: Some(theme.palette.outline.clone()),
                    line_pt: typo.table_border_pt,
                },
            )?;
            let text_zone: Zone = zone.inset(theme.flow.footer_text_inset_mm);
            renderer.draw_text(&text_zone, &lines.join("\n"), &prose(theme, typo.prose_pt, base_pt))
        }
        ContentGroup::FlatBlock(text) => {
            renderer.draw_text(zone, text, &prose(theme, base_pt, base_pt))
        }
    }
}

fn solid(color: &str) -> RectStyle {
    RectStyle {
        fill: color.to_string(),
        line_color: None,
        line_pt: 0.0,
    }
}

/// Centered white text on a coloured band.
fn banner_text(theme: &LayoutTheme, size_pt: f32, bold: bool) -> TextStyle {
    TextStyle {
        font_face: theme.typography.font_face.clone(),
        size_pt,
        color: theme.palette.on_primary.clone(),
        bold,
        align: HAlign::Center,
        valign: VAlign::Middle,
        line_spacing_pt: None,
        paragraph_after_pt: None,
        shrink_to_fit: true,
        wrap: true,
    }
}

/// Left/top wrapped body text. Line spacing follows the variant's base size.
fn prose(theme: &LayoutTheme, size_pt: f32, base_pt: f32) -> TextStyle {
    let typo = &theme.typography;
    TextStyle {
        font_face: typo.font_face.clone(),
        size_pt,
        color: theme.palette.text.clone(),
        bold: false,
        align: HAlign::Left,
        valign: VAlign::Top,
        line_spacing_pt: Some(typo.line_spacing_pt(base_pt)),
        paragraph_after_pt: Some(typo.paragraph_after_pt),
        shrink_to_fit: true,
        wrap: true,
    }
}

fn table_style(theme: &LayoutTheme, base_pt: f32) -> TableStyle {
    TableStyle {
        font_face: theme.typography.font_face.clone(),
        size_pt: base_pt,
        color: theme.palette.text.clone(),
        header_fill: theme.palette.table_header_fill.clone(),
        cell_fill: theme.palette.table_cell_fill.clone(),
        border_color: theme.palette.outline.clone(),
        border_pt: theme.typography.table_border_pt,
        bold_header: true,
        bold_first_column: true,
        cell_margin_pt: 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{default_a4_theme, DEFAULT_FONT};
    use crate::notice::RenderPayload;
    use crate::render::render_notice;
    use crate::render::testing::{DrawOp, RecordingRenderer};

    fn record(json: &str) -> (Vec<DrawOp>, FlowPlan) {
        let theme = default_a4_theme(DEFAULT_FONT);
        let request =
            NoticeRequest::from_payload(serde_json::from_str::<RenderPayload>(json).unwrap());
        let mut rec = RecordingRenderer::default();
        let plan = render_notice(&request, &theme, &mut rec).unwrap();
        (rec.ops, plan)
    }

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_general_notice_draw_order() {
        let (ops, _) = record(
            r#"{"title": "반려견 목줄 착용안내", "notice_no": "제2025-001호",
                "period": "2025.10.14 ~ 2025.10.21", "body": "관리사무실에서 안내드립니다.\n협조 부탁드립니다.",
                "apt_name": "한공원 아파트"}"#,
        );
        assert!(matches!(ops[0], DrawOp::Page { width, height } if width == 210.0 && height == 297.0));
        assert_eq!(
            texts(&ops),
            vec![
                "반려견 목줄 착용안내",
                "공고번호: 제2025-001호   |   게시기간: 2025-10-14 ~ 2025-10-21",
                "관리사무실에서 안내드립니다.\n협조 부탁드립니다.",
                "한공원 아파트 관리사무소장 [직인생략]",
            ]
        );
        // page + (rect, text) header + (rect, text) info + body rect + block + (rect, text) footer
        assert_eq!(ops.len(), 9);
    }

    #[test]
    fn test_general_block_uses_general_font_size() {
        let (ops, _) = record(r#"{"body": ["본문"]}"#);
        let style = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { text, style, .. } if text == "본문" => Some(style.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(style.size_pt, 15.0);
        assert_eq!(style.line_spacing_pt, Some(22.0));
        assert!(style.shrink_to_fit);
    }

    #[test]
    fn test_result_table_has_header_row_and_label_column() {
        let (ops, _) = record(
            r#"{"type": "result", "body": ["선정 결과를 공고합니다.", "- 아래 -", "상호: ABC", "사유 및 결과: 선정"]}"#,
        );
        let (zone, rows, widths) = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Table {
                    zone,
                    rows,
                    column_widths,
                } => Some((*zone, rows.clone(), column_widths.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(rows[0], vec!["항목", "내용"]);
        assert_eq!(rows[1], vec!["상호", "ABC"]);
        assert_eq!(widths[0], 38.0);
        assert!((widths[0] + widths[1] - zone.width).abs() < 1e-3);

        let all = texts(&ops);
        assert!(all.contains(&"- 아래 -"));
        assert!(all.contains(&"사유 및 결과"));
        assert!(all.contains(&"선정"));
    }

    #[test]
    fn test_dropped_footer_is_not_emitted() {
        let mut body: Vec<String> = (0..30).map(|i| format!("\"항목{i}: 값\"")).collect();
        body.push("\"사유 및 결과: 사라질 비고\"".to_string());
        let json = format!(r#"{{"type": "result", "body": [{}]}}"#, body.join(","));
        let (ops, plan) = record(&json);
        assert!(plan.footer_dropped);
        assert!(!texts(&ops).contains(&"사라질 비고"));
    }

    #[test]
    fn test_every_body_draw_stays_inside_body() {
        let (ops, plan) = record(
            r#"{"type": "result", "body": ["a", "b", "c", "- 아래 -", "x: 1", "y: 2", "비고 1", "비고 2"]}"#,
        );
        let body = plan.inner;
        let inside = ops.iter().skip(6).take(ops.len() - 8).all(|op| match op {
            DrawOp::Rect { zone, .. } | DrawOp::Text { zone, .. } | DrawOp::Table { zone, .. } => {
                body.contains(zone)
            }
            DrawOp::Page { .. } => false,
        });
        assert!(inside);
    }
}
