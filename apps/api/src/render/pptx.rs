//! PPTX encoder: a `DocumentRenderer` that writes DrawingML shapes onto a single
//! slide and packages the result as an OOXML presentation.

use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::layout::theme::Palette;
use crate::layout::Zone;
use crate::render::pptx_parts::{self, NS_A, NS_P, NS_R, SP_TREE_HEADER};
use crate::render::{
    DocumentRenderer, HAlign, RectStyle, RenderError, TableStyle, TextStyle, VAlign,
};

/// English Metric Units per millimetre.
const EMU_PER_MM: f32 = 36_000.0;
/// English Metric Units per typographic point.
const EMU_PER_PT: f32 = 12_700.0;
const TEXT_LANG: &str = "ko-KR";

pub(crate) fn mm_to_emu(mm: f32) -> i64 {
    (mm * EMU_PER_MM).round() as i64
}

fn pt_to_emu(pt: f32) -> i64 {
    (pt * EMU_PER_PT).round() as i64
}

/// Font size in hundredths of a point, as DrawingML expects.
fn font_size(pt: f32) -> u32 {
    (pt * 100.0).round() as u32
}

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
///
/// A vertical tab or form feed (common in pasted word-processor text) becomes a
/// space; other C0 controls and the U+FFFE/U+FFFF non-characters are removed.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            '\u{0B}' | '\u{0C}' => out.push(' '),
            c if c < '\u{20}' => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

/// Run properties shared by text boxes and table cells.
struct RunFormat<'a> {
    size_pt: f32,
    bold: bool,
    color: &'a str,
    font_face: &'a str,
}

impl RunFormat<'_> {
    fn write_paragraph(&self, xml: &mut String, text: &str, ppr: &str) -> Result<(), RenderError> {
        let sz = font_size(self.size_pt);
        xml.push_str("<a:p>");
        xml.push_str(ppr);
        if !text.is_empty() {
            xml.push_str("<a:r>");
            write!(xml, r#"<a:rPr lang="{TEXT_LANG}" altLang="en-US" sz="{sz}""#)?;
            if self.bold {
                xml.push_str(r#" b="1""#);
            }
            xml.push_str(r#" dirty="0">"#);
            write!(
                xml,
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                self.color
            )?;
            let face = escape_xml(self.font_face);
            write!(xml, r#"<a:latin typeface="{face}"/><a:ea typeface="{face}"/>"#)?;
            xml.push_str("</a:rPr>");
            write!(xml, "<a:t>{}</a:t>", escape_xml(text))?;
            xml.push_str("</a:r>");
        }
        write!(xml, r#"<a:endParaRPr lang="{TEXT_LANG}" sz="{sz}" dirty="0"/>"#)?;
        xml.push_str("</a:p>");
        Ok(())
    }
}

/// Single-slide presentation builder.
///
/// Shapes are serialized as they are drawn; [`PptxRenderer::finish`] wraps them in
/// the slide and writes every package part into a ZIP archive.
#[derive(Debug)]
pub struct PptxRenderer {
    created: DateTime<Utc>,
    title: String,
    palette: Palette,
    font_face: Option<String>,
    page_emu: Option<(i64, i64)>,
    shapes: String,
    next_shape_id: u32,
}

impl PptxRenderer {
    /// `palette` feeds the colour scheme of the presentation theme part.
    pub fn new(created: DateTime<Utc>, palette: Palette) -> Self {
        Self {
            created,
            title: String::new(),
            palette,
            font_face: None,
            page_emu: None,
            shapes: String::with_capacity(16 * 1024),
            // id 1 is the slide's group shape
            next_shape_id: 2,
        }
    }

    /// Document title stored in the core properties.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[cfg(test)]
    pub fn shape_count(&self) -> u32 {
        self.next_shape_id - 2
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    fn write_xfrm(&mut self, zone: &Zone) -> Result<(), RenderError> {
        write!(
            self.shapes,
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            mm_to_emu(zone.x),
            mm_to_emu(zone.y),
            mm_to_emu(zone.width),
            mm_to_emu(zone.height)
        )?;
        Ok(())
    }

    /// The slide part holding every shape drawn so far.
    pub(crate) fn slide_xml(&self) -> String {
        let mut xml = String::with_capacity(self.shapes.len() + 1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(SP_TREE_HEADER);
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }

    /// Packages the presentation. Fails if no page was started.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let (width, height) = self.page_emu.ok_or(RenderError::NoPage)?;
        let font = self
            .font_face
            .as_deref()
            .unwrap_or(crate::layout::DEFAULT_FONT);

        let parts: Vec<(&str, String)> = vec![
            (pptx_parts::CONTENT_TYPES_PATH, pptx_parts::content_types_xml()),
            ("_rels/.rels", pptx_parts::package_rels_xml()),
            (
                "docProps/core.xml",
                pptx_parts::core_props_xml(&self.title, &self.created),
            ),
            ("docProps/app.xml", pptx_parts::app_props_xml()),
            ("ppt/presentation.xml", pptx_parts::presentation_xml(width, height)?),
            ("ppt/_rels/presentation.xml.rels", pptx_parts::presentation_rels_xml()),
            ("ppt/slideMasters/slideMaster1.xml", pptx_parts::slide_master_xml()),
            (
                "ppt/slideMasters/_rels/slideMaster1.xml.rels",
                pptx_parts::slide_master_rels_xml(),
            ),
            ("ppt/slideLayouts/slideLayout1.xml", pptx_parts::slide_layout_xml()),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                pptx_parts::slide_layout_rels_xml(),
            ),
            ("ppt/theme/theme1.xml", pptx_parts::theme_xml(font, &self.palette)),
            (pptx_parts::SLIDE_PATH, self.slide_xml()),
            ("ppt/slides/_rels/slide1.xml.rels", pptx_parts::slide_rels_xml()),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, body) in &parts {
            zip.start_file(*name, options)?;
            zip.write_all(body.as_bytes())?;
        }
        let bytes = zip.finish()?.into_inner();

        debug!(
            shapes = self.next_shape_id - 2,
            bytes = bytes.len(),
            "PPTX package written"
        );
        Ok(bytes)
    }
}

impl DocumentRenderer for PptxRenderer {
    fn begin_page(&mut self, width_mm: f32, height_mm: f32) -> Result<(), RenderError> {
        self.page_emu = Some((mm_to_emu(width_mm), mm_to_emu(height_mm)));
        Ok(())
    }

    fn draw_rect(&mut self, zone: &Zone, style: &RectStyle) -> Result<(), RenderError> {
        self.page_emu.ok_or(RenderError::NoPage)?;
        let id = self.take_id();

        self.shapes.push_str("<p:sp><p:nvSpPr>");
        write!(self.shapes, r#"<p:cNvPr id="{id}" name="Rectangle {id}"/>"#)?;
        self.shapes.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr>");
        self.shapes.push_str("<p:spPr>");
        self.write_xfrm(zone)?;
        self.shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        write!(
            self.shapes,
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            style.fill
        )?;
        match &style.line_color {
            Some(color) if style.line_pt > 0.0 => write!(
                self.shapes,
                r#"<a:ln w="{}"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:ln>"#,
                pt_to_emu(style.line_pt)
            )?,
            _ => self.shapes.push_str("<a:ln><a:noFill/></a:ln>"),
        }
        self.shapes.push_str("</p:spPr></p:sp>");
        Ok(())
    }

    fn draw_text(&mut self, zone: &Zone, text: &str, style: &TextStyle) -> Result<(), RenderError> {
        self.page_emu.ok_or(RenderError::NoPage)?;
        if self.font_face.is_none() {
            self.font_face = Some(style.font_face.clone());
        }
        let id = self.take_id();

        self.shapes.push_str("<p:sp><p:nvSpPr>");
        write!(self.shapes, r#"<p:cNvPr id="{id}" name="TextBox {id}"/>"#)?;
        self.shapes
            .push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
        self.shapes.push_str("<p:spPr>");
        self.write_xfrm(zone)?;
        self.shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
        self.shapes.push_str("</p:spPr>");

        let wrap = if style.wrap { "square" } else { "none" };
        let anchor = match style.valign {
            VAlign::Top => "t",
            VAlign::Middle => "ctr",
        };
        write!(
            self.shapes,
            r#"<p:txBody><a:bodyPr wrap="{wrap}" lIns="91440" tIns="45720" rIns="91440" bIns="45720" anchor="{anchor}" rtlCol="0">"#
        )?;
        self.shapes.push_str(if style.shrink_to_fit {
            "<a:normAutofit/>"
        } else {
            "<a:noAutofit/>"
        });
        self.shapes.push_str("</a:bodyPr><a:lstStyle/>");

        let ppr = paragraph_properties(style)?;
        let run = RunFormat {
            size_pt: style.size_pt,
            bold: style.bold,
            color: &style.color,
            font_face: &style.font_face,
        };
        for line in text.split('\n') {
            run.write_paragraph(&mut self.shapes, line, &ppr)?;
        }
        self.shapes.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    fn draw_table(
        &mut self,
        zone: &Zone,
        rows: &[Vec<String>],
        column_widths_mm: &[f32],
        style: &TableStyle,
    ) -> Result<(), RenderError> {
        self.page_emu.ok_or(RenderError::NoPage)?;
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != column_widths_mm.len() {
                return Err(RenderError::RaggedTable {
                    row,
                    found: cells.len(),
                    expected: column_widths_mm.len(),
                });
            }
        }
        let id = self.take_id();

        let frame_width = mm_to_emu(zone.width);
        let mut grid: Vec<i64> = column_widths_mm.iter().map(|w| mm_to_emu(*w)).collect();
        // rounding must not leave the grid narrower or wider than the frame
        if let Some((last, rest)) = grid.split_last_mut() {
            *last = frame_width - rest.iter().sum::<i64>();
        }
        let row_height = if rows.is_empty() {
            0
        } else {
            mm_to_emu(zone.height) / rows.len() as i64
        };

        self.shapes.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
        write!(self.shapes, r#"<p:cNvPr id="{id}" name="Table {id}"/>"#)?;
        self.shapes.push_str(
            r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
        );
        write!(
            self.shapes,
            r#"<p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm>"#,
            mm_to_emu(zone.x),
            mm_to_emu(zone.y),
            frame_width,
            mm_to_emu(zone.height)
        )?;
        self.shapes.push_str(
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl>"#,
        );
        self.shapes.push_str(r#"<a:tblPr firstRow="1"/><a:tblGrid>"#);
        for w in &grid {
            write!(self.shapes, r#"<a:gridCol w="{w}"/>"#)?;
        }
        self.shapes.push_str("</a:tblGrid>");

        let margin = pt_to_emu(style.cell_margin_pt);
        let border = pt_to_emu(style.border_pt);
        for (r, cells) in rows.iter().enumerate() {
            write!(self.shapes, r#"<a:tr h="{row_height}">"#)?;
            for (c, text) in cells.iter().enumerate() {
                let is_header = r == 0;
                let run = RunFormat {
                    size_pt: style.size_pt,
                    bold: (is_header && style.bold_header) || (c == 0 && style.bold_first_column),
                    color: &style.color,
                    font_face: &style.font_face,
                };
                self.shapes
                    .push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>");
                run.write_paragraph(&mut self.shapes, text, r#"<a:pPr algn="ctr"/>"#)?;
                self.shapes.push_str("</a:txBody>");
                write!(
                    self.shapes,
                    r#"<a:tcPr marL="{margin}" marR="{margin}" marT="{margin}" marB="{margin}" anchor="ctr">"#
                )?;
                for edge in ["lnL", "lnR", "lnT", "lnB"] {
                    write!(
                        self.shapes,
                        r#"<a:{edge} w="{border}"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:{edge}>"#,
                        style.border_color
                    )?;
                }
                let fill = if is_header {
                    &style.header_fill
                } else {
                    &style.cell_fill
                };
                write!(
                    self.shapes,
                    r#"<a:solidFill><a:srgbClr val="{fill}"/></a:solidFill></a:tcPr></a:tc>"#
                )?;
            }
            self.shapes.push_str("</a:tr>");
        }
        self.shapes
            .push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
        Ok(())
    }
}

fn paragraph_properties(style: &TextStyle) -> Result<String, RenderError> {
    let algn = match style.align {
        HAlign::Left => "l",
        HAlign::Center => "ctr",
    };
    let mut ppr = String::with_capacity(128);
    write!(ppr, r#"<a:pPr algn="{algn}">"#)?;
    if let Some(spacing) = style.line_spacing_pt {
        write!(
            ppr,
            r#"<a:lnSpc><a:spcPts val="{}"/></a:lnSpc>"#,
            font_size(spacing)
        )?;
    }
    if let Some(after) = style.paragraph_after_pt {
        write!(
            ppr,
            r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
            font_size(after)
        )?;
    }
    ppr.push_str("</a:pPr>");
    Ok(ppr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Read;

    fn palette() -> Palette {
        crate::layout::default_a4_theme(crate::layout::DEFAULT_FONT).palette
    }

    fn renderer() -> PptxRenderer {
        let mut r = PptxRenderer::new(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(), palette());
        r.begin_page(210.0, 297.0).unwrap();
        r
    }

    fn text_style() -> TextStyle {
        TextStyle {
            font_face: "Malgun Gothic".to_string(),
            size_pt: 14.0,
            color: "1D1D1F".to_string(),
            bold: true,
            align: HAlign::Center,
            valign: VAlign::Middle,
            line_spacing_pt: Some(19.0),
            paragraph_after_pt: Some(3.0),
            shrink_to_fit: true,
            wrap: true,
        }
    }

    fn table_style() -> TableStyle {
        TableStyle {
            font_face: "Malgun Gothic".to_string(),
            size_pt: 13.0,
            color: "1D1D1F".to_string(),
            header_fill: "E8EDF5".to_string(),
            cell_fill: "FFFFFF".to_string(),
            border_color: "CDD9E7".to_string(),
            border_pt: 1.0,
            bold_header: true,
            bold_first_column: true,
            cell_margin_pt: 2.0,
        }
    }

    fn read_part(bytes: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_mm_to_emu() {
        assert_eq!(mm_to_emu(210.0), 7_560_000);
        assert_eq!(mm_to_emu(297.0), 10_692_000);
        assert_eq!(mm_to_emu(0.5), 18_000);
    }

    #[test]
    fn test_drawing_before_page_fails() {
        let mut r = PptxRenderer::new(Utc::now(), palette());
        let err = r
            .draw_rect(&Zone::new(0.0, 0.0, 1.0, 1.0), &RectStyle {
                fill: "FFFFFF".into(),
                line_color: None,
                line_pt: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, RenderError::NoPage));
        assert!(matches!(PptxRenderer::new(Utc::now(), palette()).finish(), Err(RenderError::NoPage)));
    }

    #[test]
    fn test_text_lines_become_paragraphs() {
        let mut r = renderer();
        r.draw_text(&Zone::new(12.0, 12.0, 186.0, 18.0), "첫 줄\n<둘째> & 끝", &text_style())
            .unwrap();
        let xml = r.slide_xml();
        assert_eq!(xml.matches("<a:p>").count(), 2);
        assert!(xml.contains("<a:t>첫 줄</a:t>"));
        assert!(xml.contains("<a:t>&lt;둘째&gt; &amp; 끝</a:t>"));
        assert!(xml.contains(r#"sz="1400" b="1""#));
        assert!(xml.contains(r#"<a:lnSpc><a:spcPts val="1900"/></a:lnSpc>"#));
        assert!(xml.contains("<a:normAutofit/>"));
        assert!(xml.contains(r#"anchor="ctr""#));
        assert!(xml.contains(r#"<a:off x="432000" y="432000"/>"#));
    }

    #[test]
    fn test_escape_drops_characters_xml_cannot_carry() {
        assert_eq!(escape_xml("A\u{0B}B"), "A B");
        assert_eq!(escape_xml("x\u{0}y\u{1F}z\u{FFFF}"), "xyz");
        assert_eq!(escape_xml("tab\there"), "tab\there");
        assert_eq!(escape_xml("<a & 'b'>"), "&lt;a &amp; &apos;b&apos;&gt;");
    }

    #[test]
    fn test_text_with_vertical_tab_stays_well_formed() {
        let mut r = renderer();
        r.draw_text(&Zone::new(0.0, 0.0, 50.0, 10.0), "A\u{0B}B\u{0C}C\u{1}", &text_style())
            .unwrap();
        let xml = r.slide_xml();
        assert!(xml.contains("<a:t>A B C</a:t>"));
        assert!(!xml.chars().any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
    }

    #[test]
    fn test_rect_without_outline_has_no_line() {
        let mut r = renderer();
        r.draw_rect(
            &Zone::new(0.0, 0.0, 10.0, 10.0),
            &RectStyle {
                fill: "1E73C8".into(),
                line_color: Some("1E73C8".into()),
                line_pt: 0.0,
            },
        )
        .unwrap();
        assert!(r.slide_xml().contains("<a:ln><a:noFill/></a:ln>"));
    }

    #[test]
    fn test_table_grid_matches_frame_width() {
        let mut r = renderer();
        let rows = vec![
            vec!["항목".to_string(), "내용".to_string()],
            vec!["상호".to_string(), "".to_string()],
        ];
        r.draw_table(
            &Zone::new(16.0, 82.0, 178.0, 30.0),
            &rows,
            &[38.0, 140.0],
            &table_style(),
        )
        .unwrap();
        let xml = r.slide_xml();
        assert!(xml.contains(r#"<a:gridCol w="1368000"/><a:gridCol w="5040000"/>"#));
        assert_eq!(xml.matches("<a:tr ").count(), 2);
        assert_eq!(xml.matches("<a:tc>").count(), 4);
        assert!(xml.contains(r#"val="E8EDF5""#));
    }

    #[test]
    fn test_ragged_table_is_rejected() {
        let mut r = renderer();
        let rows = vec![vec!["only one".to_string()]];
        let err = r
            .draw_table(&Zone::new(0.0, 0.0, 10.0, 10.0), &rows, &[5.0, 5.0], &table_style())
            .unwrap_err();
        assert!(matches!(err, RenderError::RaggedTable { row: 0, found: 1, expected: 2 }));
    }

    #[test]
    fn test_package_contains_slide_and_size() {
        let mut r = renderer().with_title("안내문");
        r.draw_text(&Zone::new(12.0, 12.0, 186.0, 18.0), "제목", &text_style())
            .unwrap();
        assert_eq!(r.shape_count(), 1);
        let bytes = r.finish().unwrap();

        let slide = read_part(bytes.clone(), "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:t>제목</a:t>"));
        let pres = read_part(bytes.clone(), "ppt/presentation.xml");
        assert!(pres.contains(r#"cx="7560000" cy="10692000""#));
        let core = read_part(bytes, "docProps/core.xml");
        assert!(core.contains("<dc:title>안내문</dc:title>"));
        assert!(core.contains("2025-01-02T03:04:05Z"));
    }
}
