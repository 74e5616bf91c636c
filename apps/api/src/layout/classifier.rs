//! Content Classifier: partitions raw body lines into the groups of a result notice.
//!
//! Single left-to-right pass with two states:
//! - `BeforeDivider`: colon-free lines are intro prose.
//! - `AfterDivider`: colon-free lines are footer commentary.
//!
//! The sentinel divider, any `label: value` row and the reserved footer label all
//! move the machine into `AfterDivider`. Order within each group is preserved.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Marker line separating intro prose from the table region.
pub const DIVIDER_TEXT: &str = "- 아래 -";
/// A `label: value` row with this label feeds the footer note, not the table.
pub const FOOTER_LABEL: &str = "사유 및 결과";
/// Substituted for an empty value of the reserved footer label.
pub const EMPTY_NOTE_PLACEHOLDER: &str = "(입력 없음)";
/// Substituted for an empty table label or value.
pub const EMPTY_CELL: &str = "-";

/// Labels of the table used when the body yields no rows at all.
pub const FALLBACK_TABLE_LABELS: [&str; 8] = [
    "상호",
    "주소",
    "대표자",
    "연락처",
    "사업자등록번호",
    "계약금액",
    "계약기간",
    "계약사유",
];

/// A semantic unit of body content, in the order the planner lays them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ContentGroup {
    Intro(Vec<String>),
    CenterDivider(String),
    TableRows(Vec<(String, String)>),
    FooterNote(Vec<String>),
    /// The whole body of a general notice, newline-joined.
    FlatBlock(String),
}

/// Classifier output for a result notice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassifiedBody {
    pub intro: Vec<String>,
    pub divider: Option<String>,
    pub table_rows: Vec<(String, String)>,
    pub footer_note: Vec<String>,
    /// True if `table_rows` came from the fallback template.
    pub used_fallback_table: bool,
}

impl ClassifiedBody {
    /// The present groups in layout order: intro, divider, table, footer note.
    /// Empty intro and footer groups are omitted; the table is always present.
    pub fn into_groups(self) -> Vec<ContentGroup> {
        let mut groups = Vec::with_capacity(4);
        if !self.intro.is_empty() {
            groups.push(ContentGroup::Intro(self.intro));
        }
        if let Some(divider) = self.divider {
            groups.push(ContentGroup::CenterDivider(divider));
        }
        groups.push(ContentGroup::TableRows(self.table_rows));
        if !self.footer_note.is_empty() {
            groups.push(ContentGroup::FooterNote(self.footer_note));
        }
        groups
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    BeforeDivider,
    AfterDivider,
}

/// One body line after trimming, as the state machine sees it.
enum Line<'a> {
    Divider(&'a str),
    Pair { label: &'a str, value: &'a str },
    Prose(&'a str),
}

fn scan_line(trimmed: &str) -> Line<'_> {
    if trimmed == DIVIDER_TEXT {
        return Line::Divider(trimmed);
    }
    match trimmed.split_once(':') {
        Some((label, value)) => Line::Pair {
            label: label.trim(),
            value: value.trim(),
        },
        None => Line::Prose(trimmed),
    }
}

/// Classifies the body lines of a result notice.
///
/// Pure function: the same input always yields the same output.
pub fn classify_result_body<S: AsRef<str>>(lines: &[S]) -> ClassifiedBody {
    let mut out = ClassifiedBody::default();
    let mut region = Region::BeforeDivider;

    for raw in lines {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        match scan_line(trimmed) {
            Line::Divider(text) => {
                out.divider = Some(text.to_string());
                region = Region::AfterDivider;
            }
            Line::Pair { label, value } if label == FOOTER_LABEL => {
                let note = if value.is_empty() {
                    EMPTY_NOTE_PLACEHOLDER
                } else {
                    value
                };
                out.footer_note.push(note.to_string());
                region = Region::AfterDivider;
            }
            Line::Pair { label, value } => {
                out.table_rows.push((non_empty_or_dash(label), non_empty_or_dash(value)));
                region = Region::AfterDivider;
            }
            Line::Prose(text) => match region {
                Region::BeforeDivider => out.intro.push(text.to_string()),
                Region::AfterDivider => out.footer_note.push(text.to_string()),
            },
        }
    }

    if out.table_rows.is_empty() {
        info!("No table rows in result body; substituting the blank template");
        out.table_rows = fallback_table_rows();
        out.used_fallback_table = true;
    }

    out
}

/// The 8-row blank table used when a result body has no `label: value` lines.
pub fn fallback_table_rows() -> Vec<(String, String)> {
    FALLBACK_TABLE_LABELS
        .iter()
        .map(|label| (label.to_string(), String::new()))
        .collect()
}

/// Joins the body of a general notice into one opaque block.
pub fn flatten_general_body<S: AsRef<str>>(lines: &[S], placeholder: &str) -> ContentGroup {
    let joined = lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.is_empty() {
        ContentGroup::FlatBlock(placeholder.to_string())
    } else {
        ContentGroup::FlatBlock(joined)
    }
}

fn non_empty_or_dash(s: &str) -> String {
    if s.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_result_body() {
        let lines = [
            "선정 결과를 공고합니다.",
            "- 아래 -",
            "상호: ABC",
            "사유 및 결과: 선정",
        ];
        let c = classify_result_body(&lines);
        assert_eq!(c.intro, vec!["선정 결과를 공고합니다."]);
        assert_eq!(c.divider.as_deref(), Some("- 아래 -"));
        assert_eq!(c.table_rows, vec![("상호".to_string(), "ABC".to_string())]);
        assert_eq!(c.footer_note, vec!["선정"]);
        assert!(!c.used_fallback_table);
    }

    #[test]
    fn test_only_first_colon_delimits() {
        let c = classify_result_body(&["계약기간: 09:00 ~ 18:00"]);
        assert_eq!(
            c.table_rows,
            vec![("계약기간".to_string(), "09:00 ~ 18:00".to_string())]
        );
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let c = classify_result_body(&["", "   ", "안내", "\t"]);
        assert_eq!(c.intro, vec!["안내"]);
        assert!(c.footer_note.is_empty());
    }

    #[test]
    fn test_empty_label_and_value_become_dashes() {
        let c = classify_result_body(&[":", "주소:", ": 값"]);
        assert_eq!(
            c.table_rows,
            vec![
                ("-".to_string(), "-".to_string()),
                ("주소".to_string(), "-".to_string()),
                ("-".to_string(), "값".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_footer_label_gets_placeholder() {
        let c = classify_result_body(&["사유 및 결과:"]);
        assert_eq!(c.footer_note, vec![EMPTY_NOTE_PLACEHOLDER]);
    }

    #[test]
    fn test_prose_after_table_goes_to_footer_note() {
        let c = classify_result_body(&["인사말", "상호: A", "문의는 관리사무소로", "감사합니다"]);
        assert_eq!(c.intro, vec!["인사말"]);
        assert_eq!(c.footer_note, vec!["문의는 관리사무소로", "감사합니다"]);
        assert!(c.divider.is_none());
    }

    #[test]
    fn test_footer_label_flips_region_without_table_row() {
        let c = classify_result_body(&["사유 및 결과: 최저가", "추가 설명"]);
        assert_eq!(c.footer_note, vec!["최저가", "추가 설명"]);
        assert!(c.intro.is_empty());
        assert!(c.used_fallback_table);
    }

    #[test]
    fn test_empty_input_falls_back_to_eight_row_template() {
        let empty: [&str; 0] = [];
        let c = classify_result_body(&empty);
        assert_eq!(c.table_rows.len(), 8);
        assert!(c.table_rows.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(c.table_rows[0].0, "상호");
        assert_eq!(c.table_rows[7].0, "계약사유");
        assert!(c.used_fallback_table);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let lines = ["공고", "- 아래 -", "상호: A", "주소: B", "비고", "사유 및 결과: C"];
        assert_eq!(classify_result_body(&lines), classify_result_body(&lines));
    }

    #[test]
    fn test_lines_are_trimmed_before_matching_divider() {
        let c = classify_result_body(&["   - 아래 -  "]);
        assert_eq!(c.divider.as_deref(), Some(DIVIDER_TEXT));
    }

    #[test]
    fn test_groups_omit_empty_intro_and_footer() {
        let groups = classify_result_body(&["상호: A"]).into_groups();
        assert_eq!(
            groups,
            vec![ContentGroup::TableRows(vec![("상호".to_string(), "A".to_string())])]
        );
    }

    #[test]
    fn test_groups_keep_layout_order() {
        let groups = classify_result_body(&["사유 및 결과: X", "상호: A", "- 아래 -", "머리말"])
            .into_groups();
        let kinds: Vec<&str> = groups
            .iter()
            .map(|g| match g {
                ContentGroup::Intro(_) => "intro",
                ContentGroup::CenterDivider(_) => "divider",
                ContentGroup::TableRows(_) => "table",
                ContentGroup::FooterNote(_) => "footer",
                ContentGroup::FlatBlock(_) => "flat",
            })
            .collect();
        assert_eq!(kinds, vec!["divider", "table", "footer"]);
    }

    #[test]
    fn test_flatten_general_joins_with_newlines() {
        assert_eq!(
            flatten_general_body(&["a", "b"], "(빈 본문)"),
            ContentGroup::FlatBlock("a\nb".to_string())
        );
        assert_eq!(
            flatten_general_body(&[""], "(빈 본문)"),
            ContentGroup::FlatBlock("(빈 본문)".to_string())
        );
    }
}
