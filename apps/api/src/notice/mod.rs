// Notice request model: the wire payload, its defaults, and the normalized request
// that the layout and rendering stages consume.

pub mod handlers;

use serde::{Deserialize, Deserializer, Serialize};

use crate::layout::theme::Typography;

pub const DEFAULT_TITLE: &str = "제목을 입력하세요";
pub const DEFAULT_PERIOD: &str = "YYYY-MM-DD ~ YYYY-MM-DD";
pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";
pub const BODY_PLACEHOLDER: &str = "(AI 본문 자리)";
pub const EMPTY_NOTICE_NUMBER: &str = "-";
const FOOTER_SIGNATURE_SUFFIX: &str = "관리사무소장 [직인생략]";

/// Body used when the client sends an explicitly empty `body` array.
pub const DEFAULT_BODY_TEMPLATE: [&str; 10] = [
    "국토교통부 고시 [주택관리업자 및 사업자 선정지침] 제11조에 따라 사업자 선정결과를 아래와 같이 공고합니다.",
    "상호: {상호}",
    "주소: {주소}",
    "대표자: {대표자}",
    "연락처: {연락처}",
    "사업자등록번호: {사업자등록번호}",
    "계약금액: {계약금액}",
    "계약기간: {계약기간}",
    "계약사유: {계약사유}",
    "사유 및 결과: {사유및결과}",
];

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// `body` may be one newline-separated string or an array of lines.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyField {
    Text(String),
    Lines(Vec<serde_json::Value>),
    /// `null` or any other JSON value; treated as an empty body.
    Other,
}

impl From<serde_json::Value> for BodyField {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => BodyField::Text(s),
            serde_json::Value::Array(items) => BodyField::Lines(items),
            _ => BodyField::Other,
        }
    }
}

/// A present `body` key always yields `Some`, even for `null`; only an absent
/// key falls back to `None` through `#[serde(default)]`.
fn present_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BodyField>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(|v| Some(BodyField::from(v)))
}

/// JSON body of `POST /api/v1/notices/render`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderPayload {
    pub notice_no: Option<String>,
    pub apt_name: Option<String>,
    pub period: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_body")]
    pub body: Option<BodyField>,
    pub footer: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized request
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Free text notice: the body is one opaque block.
    General,
    /// Selection result notice: intro, divider, key/value table, footer note.
    Result,
}

impl Variant {
    /// `"result"` selects the structured layout; anything else is general.
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("result") => Variant::Result,
            _ => Variant::General,
        }
    }

    pub fn download_name(&self) -> &'static str {
        match self {
            Variant::Result => "결과안내문.pptx",
            Variant::General => "notice_a4.pptx",
        }
    }

    pub fn base_font_pt(&self, typography: &Typography) -> f32 {
        match self {
            Variant::Result => typography.result_body_pt,
            Variant::General => typography.general_body_pt,
        }
    }
}

/// A render request with every default applied. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticeRequest {
    pub notice_number: String,
    pub facility_name: String,
    pub period_start: String,
    pub period_end: String,
    pub title: String,
    pub body_lines: Vec<String>,
    pub footer_text: String,
    pub variant: Variant,
}

impl NoticeRequest {
    pub fn from_payload(payload: RenderPayload) -> Self {
        let facility_name = payload.apt_name.unwrap_or_default();
        let (period_start, period_end) =
            parse_period(payload.period.as_deref().unwrap_or(DEFAULT_PERIOD));

        let notice_number = match payload.notice_no {
            Some(n) if !n.is_empty() => n,
            _ => EMPTY_NOTICE_NUMBER.to_string(),
        };

        let title = match payload.title {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_TITLE.to_string(),
        };

        let footer_text = footer_text(payload.footer.as_deref(), &facility_name);

        NoticeRequest {
            notice_number,
            period_start,
            period_end,
            title,
            body_lines: body_lines(payload.body),
            footer_text,
            facility_name,
            variant: Variant::from_type(payload.kind.as_deref()),
        }
    }

    /// Text of the info bar under the title.
    pub fn info_line(&self) -> String {
        format!(
            "공고번호: {}   |   게시기간: {} ~ {}",
            self.notice_number, self.period_start, self.period_end
        )
    }
}

/// Splits `"start ~ end"`, trimming both parts and normalizing `.` to `-`.
/// Missing or empty parts become `YYYY-MM-DD`.
pub fn parse_period(raw: &str) -> (String, String) {
    let mut parts = raw.split('~').map(|s| s.trim().replace('.', "-"));
    let mut next = || {
        parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
    };
    let start = next();
    let end = next();
    (start, end)
}

fn body_lines(body: Option<BodyField>) -> Vec<String> {
    let lines = match body {
        None => return vec![BODY_PLACEHOLDER.to_string()],
        Some(BodyField::Text(text)) => text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect(),
        Some(BodyField::Lines(values)) => values.into_iter().map(value_to_line).collect(),
        Some(BodyField::Other) => Vec::new(),
    };

    if lines.is_empty() {
        DEFAULT_BODY_TEMPLATE.iter().map(|l| l.to_string()).collect()
    } else {
        lines
    }
}

fn value_to_line(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn footer_text(footer: Option<&str>, facility_name: &str) -> String {
    match footer.map(str::trim) {
        Some(f) if !f.is_empty() => f.to_string(),
        _ if !facility_name.is_empty() => format!("{facility_name} {FOOTER_SIGNATURE_SUFFIX}"),
        _ => String::new(),
    }
}
