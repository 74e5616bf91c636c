//! Adaptive Flow Planner: assigns a zone to every content group inside the body.
//!
//! Groups are stacked top to bottom from a cursor starting at the inset body top.
//! The planner never fails on overflow. It clips instead:
//! - the table is clipped to whatever height remains below the cursor,
//! - the footer note is dropped when less than the residual threshold remains.
//!
//! Every assigned zone lies inside the inset body rectangle.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::layout::classifier::ContentGroup;
use crate::layout::geometry::Zone;
use crate::layout::theme::FlowMetrics;

/// One group with the zone it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub group: ContentGroup,
    pub zone: Zone,
    /// Heading above the group; only the footer note carries one.
    pub caption: Option<Zone>,
}

/// Final ordered list of placements consumed by emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPlan {
    /// The inset body rectangle every placement is confined to.
    pub inner: Zone,
    pub placements: Vec<Placement>,
    /// Table wanted more height than remained.
    pub table_clipped: bool,
    /// A footer note existed but had no room.
    pub footer_dropped: bool,
}

fn layout_rank(group: &ContentGroup) -> u8 {
    match group {
        ContentGroup::Intro(_) => 0,
        ContentGroup::CenterDivider(_) => 1,
        ContentGroup::TableRows(_) => 2,
        ContentGroup::FooterNote(_) => 3,
        ContentGroup::FlatBlock(_) => 4,
    }
}

/// Height wanted by a text group of `lines` lines.
fn text_height(lines: usize, minimum: f32, flow: &FlowMetrics) -> f32 {
    minimum.max(lines as f32 * flow.per_line_mm + flow.line_padding_mm)
}

/// A zone starting at the cursor, clamped so it never leaves `inner`.
fn slot(inner: &Zone, cursor: f32, wanted: f32) -> Zone {
    let y = cursor.clamp(inner.y, inner.bottom());
    let height = wanted.min(inner.bottom() - y).max(0.0);
    Zone::new(inner.x, y, inner.width, height)
}

/// Lays out the groups of a result notice inside `body`.
pub fn plan_result_flow(body: &Zone, groups: Vec<ContentGroup>, flow: &FlowMetrics) -> FlowPlan {
    let inner = body.inset(flow.body_inset_mm);
    let bottom = inner.bottom();
    let mut cursor = inner.y;
    let mut placements = Vec::with_capacity(groups.len());
    let mut table_clipped = false;
    let mut footer_dropped = false;

    let mut groups = groups;
    groups.sort_by_key(layout_rank);

    for group in groups {
        let placed = match &group {
            ContentGroup::Intro(lines) => {
                let wanted = (inner.height * flow.intro_max_fraction)
                    .min(text_height(lines.len(), flow.intro_min_mm, flow));
                let zone = slot(&inner, cursor, wanted);
                cursor = zone.bottom() + flow.group_gap_mm;
                Some((zone, None))
            }
            ContentGroup::CenterDivider(_) => {
                let zone = slot(&inner, cursor, flow.divider_height_mm);
                cursor = zone.bottom() + flow.group_gap_mm;
                Some((zone, None))
            }
            ContentGroup::TableRows(rows) => {
                let wanted = rows.len() as f32 * flow.table_row_mm + flow.table_header_padding_mm;
                let remaining = (bottom - cursor).max(0.0);
                if wanted > remaining {
                    debug!(wanted, remaining, "Table clipped to remaining body height");
                    table_clipped = true;
                }
                let zone = slot(&inner, cursor, wanted);
                cursor = zone.bottom() + flow.table_gap_mm;
                Some((zone, None))
            }
            ContentGroup::FooterNote(lines) if lines.is_empty() => None,
            ContentGroup::FooterNote(lines) => {
                if cursor >= bottom - flow.footer_residual_mm {
                    info!(lines = lines.len(), "No room left for footer note; dropping it");
                    footer_dropped = true;
                    None
                } else {
                    let caption = slot(&inner, cursor, flow.footer_label_mm);
                    let box_top = caption.bottom() + flow.footer_label_gap_mm;
                    let wanted = text_height(lines.len(), flow.footer_min_mm, flow);
                    let height = (bottom - box_top).min(wanted);
                    if height <= 0.0 {
                        info!("Footer note squeezed to zero height; dropping it");
                        footer_dropped = true;
                        None
                    } else {
                        let zone = Zone::new(inner.x, box_top, inner.width, height);
                        cursor = zone.bottom();
                        Some((zone, Some(caption)))
                    }
                }
            }
            ContentGroup::FlatBlock(_) => {
                let zone = slot(&inner, cursor, bottom - cursor);
                cursor = zone.bottom();
                Some((zone, None))
            }
        };

        if let Some((zone, caption)) = placed {
            placements.push(Placement {
                group,
                zone,
                caption,
            });
        }
    }

    debug!(
        placements = placements.len(),
        used_mm = cursor - inner.y,
        available_mm = inner.height,
        "Result flow planned"
    );

    FlowPlan {
        inner,
        placements,
        table_clipped,
        footer_dropped,
    }
}

/// A general notice is one block filling the whole inset body.
pub fn plan_general_flow(body: &Zone, block: ContentGroup, flow: &FlowMetrics) -> FlowPlan {
    let inner = body.inset(flow.body_inset_mm);
    FlowPlan {
        inner,
        placements: vec![Placement {
            group: block,
            zone: inner,
            caption: None,
        }],
        table_clipped: false,
        footer_dropped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::classifier::classify_result_body;
    use crate::layout::geometry::compute_geometry;
    use crate::layout::theme::{default_a4_theme, LayoutTheme, DEFAULT_FONT};
    use proptest::prelude::*;

    fn theme() -> LayoutTheme {
        default_a4_theme(DEFAULT_FONT)
    }

    fn a4_body() -> Zone {
        compute_geometry(&theme().page).unwrap().body
    }

    fn rows(n: usize) -> Vec<(String, String)> {
        (0..n).map(|i| (format!("항목{i}"), format!("값{i}"))).collect()
    }

    fn assert_stacked(plan: &FlowPlan) {
        let mut last_bottom = plan.inner.y;
        for p in &plan.placements {
            let zones = p.caption.iter().chain(std::iter::once(&p.zone));
            for z in zones {
                assert!(plan.inner.contains(z), "{z:?} escapes {:?}", plan.inner);
                assert!(z.y + 1e-3 >= last_bottom, "{z:?} overlaps previous group");
                assert!(z.height >= 0.0);
                last_bottom = z.bottom();
            }
        }
    }

    #[test]
    fn test_reference_layout_on_a4() {
        let t = theme();
        let groups = classify_result_body(&[
            "선정 결과를 공고합니다.",
            "- 아래 -",
            "상호: ABC",
            "사유 및 결과: 선정",
        ])
        .into_groups();
        let plan = plan_result_flow(&a4_body(), groups, &t.flow);

        assert_eq!(plan.inner, Zone::new(16.0, 50.0, 178.0, 211.0));
        assert_eq!(plan.placements.len(), 4);

        // intro: max(18, 1*8+8) = 18, below the 30% cap
        let intro = &plan.placements[0].zone;
        assert_eq!((intro.y, intro.height), (50.0, 18.0));

        let divider = &plan.placements[1].zone;
        assert_eq!((divider.y, divider.height), (71.0, 8.0));

        // table: 1*12 + 18
        let table = &plan.placements[2].zone;
        assert_eq!((table.y, table.height), (82.0, 30.0));

        let footer = &plan.placements[3];
        let caption = footer.caption.unwrap();
        assert_eq!((caption.y, caption.height), (116.0, 6.0));
        assert_eq!((footer.zone.y, footer.zone.height), (124.0, 24.0));

        assert!(!plan.table_clipped);
        assert!(!plan.footer_dropped);
        assert_stacked(&plan);
    }

    #[test]
    fn test_intro_capped_at_thirty_percent() {
        let t = theme();
        let intro: Vec<String> = (0..20).map(|i| format!("문장 {i}")).collect();
        let plan = plan_result_flow(
            &a4_body(),
            vec![ContentGroup::Intro(intro), ContentGroup::TableRows(rows(1))],
            &t.flow,
        );
        let cap = plan.inner.height * 0.3;
        assert!((plan.placements[0].zone.height - cap).abs() < 1e-3);
    }

    #[test]
    fn test_table_clipped_exactly_to_remaining() {
        let t = theme();
        let plan = plan_result_flow(
            &a4_body(),
            vec![
                ContentGroup::TableRows(rows(40)),
                ContentGroup::FooterNote(vec!["밀려난 비고".into()]),
            ],
            &t.flow,
        );
        let table = &plan.placements[0].zone;
        assert_eq!(table.y, plan.inner.y);
        assert!((table.height - plan.inner.height).abs() < 1e-3);
        assert!(plan.table_clipped);
        assert!(plan.footer_dropped);
        assert_eq!(plan.placements.len(), 1);
    }

    #[test]
    fn test_footer_dropped_when_residual_too_small() {
        let t = theme();
        // inner height 211: table of 15 rows wants 198, leaving 211 - 198 - 4 = 9 < 10
        let plan = plan_result_flow(
            &a4_body(),
            vec![
                ContentGroup::TableRows(rows(15)),
                ContentGroup::FooterNote(vec!["비고".into()]),
            ],
            &t.flow,
        );
        assert!(!plan.table_clipped);
        assert!(plan.footer_dropped);
        assert_stacked(&plan);
    }

    #[test]
    fn test_footer_shrinks_to_fit_residual() {
        let t = theme();
        // table 14 rows = 186; cursor = 50 + 186 + 4 = 240; bottom 261; residual 21
        let plan = plan_result_flow(
            &a4_body(),
            vec![
                ContentGroup::TableRows(rows(14)),
                ContentGroup::FooterNote(vec!["비고".into()]),
            ],
            &t.flow,
        );
        let footer = &plan.placements[1];
        assert!(!plan.footer_dropped);
        assert!((footer.zone.height - 13.0).abs() < 1e-3);
        assert!((footer.zone.bottom() - plan.inner.bottom()).abs() < 1e-3);
        assert_stacked(&plan);
    }

    #[test]
    fn test_tiny_body_never_escapes() {
        let t = theme();
        let body = Zone::new(12.0, 46.0, 186.0, 20.0);
        let plan = plan_result_flow(
            &body,
            classify_result_body(&["인사", "- 아래 -", "상호: A", "비고"]).into_groups(),
            &t.flow,
        );
        assert_stacked(&plan);
    }

    #[test]
    fn test_general_block_fills_inner_body() {
        let t = theme();
        let plan = plan_general_flow(
            &a4_body(),
            ContentGroup::FlatBlock("본문".into()),
            &t.flow,
        );
        assert_eq!(plan.placements.len(), 1);
        assert_eq!(plan.placements[0].zone, plan.inner);
    }

    proptest! {
        #[test]
        fn prop_no_zone_passes_body_bottom(
            body_height in 0.0f32..400.0,
            intro_lines in 0usize..30,
            table_rows in 0usize..60,
            note_lines in 0usize..10,
            with_divider in any::<bool>(),
        ) {
            let t = theme();
            let body = Zone::new(12.0, 46.0, 186.0, body_height);
            let mut groups = Vec::new();
            if intro_lines > 0 {
                groups.push(ContentGroup::Intro(vec!["x".to_string(); intro_lines]));
            }
            if with_divider {
                groups.push(ContentGroup::CenterDivider("- 아래 -".into()));
            }
            groups.push(ContentGroup::TableRows(rows(table_rows)));
            if note_lines > 0 {
                groups.push(ContentGroup::FooterNote(vec!["y".to_string(); note_lines]));
            }
            let plan = plan_result_flow(&body, groups, &t.flow);
            for p in &plan.placements {
                prop_assert!(p.zone.bottom() <= body.bottom() + 1e-3);
                prop_assert!(p.zone.height >= 0.0);
                if let Some(c) = p.caption {
                    prop_assert!(c.bottom() <= body.bottom() + 1e-3);
                }
            }
        }
    }
}
