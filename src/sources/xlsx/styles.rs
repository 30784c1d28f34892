//! Cell number formats of a zipped-XML workbook.
//!
//! The value decoder resolves cell styles only as far as "date or not", so the display format of
//! each cell is read here from the raw parts: `xl/styles.xml` maps a style index to a number
//! format, and each worksheet part maps a cell to its style index.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::BufRead;

pub(crate) const GENERAL: &str = "General";

/// Format codes Excel knows by id without listing them in `numFmts`.
fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some(GENERAL),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

fn attribute<R>(reader: &Reader<R>, element: &BytesStart, name: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.decode_and_unescape_value(reader)?.into_owned()));
        }
    }
    Ok(None)
}

/// The number format of every cell style of a workbook.
#[derive(Debug, Default)]
pub(crate) struct NumberFormats {
    custom: HashMap<u32, String>,
    cell_xfs: Vec<u32>,
}

impl NumberFormats {
    /// Reads `numFmts` and `cellXfs` from a styles part.
    pub(crate) fn parse<R: BufRead>(xml: R) -> quick_xml::Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut formats = Self::default();
        let mut in_cell_xfs = false;
        let mut buf = Vec::with_capacity(512);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
                Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"numFmt" => {
                        let id = attribute(&reader, &e, b"numFmtId")?.and_then(|id| id.parse().ok());
                        let code = attribute(&reader, &e, b"formatCode")?;
                        if let (Some(id), Some(code)) = (id, code) {
                            formats.custom.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let id = attribute(&reader, &e, b"numFmtId")?.and_then(|id| id.parse().ok());
                        formats.cell_xfs.push(id.unwrap_or(0));
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(formats)
    }

    /// The display format of cells with style index `style`.
    pub(crate) fn format(&self, style: usize) -> &str {
        let id = self.cell_xfs.get(style).copied().unwrap_or(0);
        self.custom
            .get(&id)
            .map(String::as_str)
            .or_else(|| builtin_format(id))
            .unwrap_or(GENERAL)
    }
}

/// Relationship targets of `xl/_rels/workbook.xml.rels`, keyed by id.
fn relationships<R: BufRead>(xml: R) -> quick_xml::Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    let mut targets = HashMap::new();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&reader, &e, b"Id")?;
                let target = attribute(&reader, &e, b"Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(targets)
}

/// Archive part names of the workbook's sheets, in workbook order.
///
/// A sheet whose relationship cannot be resolved has no part name.
pub(crate) fn sheet_parts<W, L>(workbook: W, rels: L) -> quick_xml::Result<Vec<Option<String>>>
where
    W: BufRead,
    L: BufRead,
{
    let targets = relationships(rels)?;
    let mut reader = Reader::from_reader(workbook);
    let mut parts = Vec::new();
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let part = attribute(&reader, &e, b"id")?
                    .and_then(|id| targets.get(&id))
                    .map(|target| match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_owned(),
                        None if target.starts_with("xl/") => target.clone(),
                        None => format!("xl/{target}"),
                    });
                parts.push(part);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parts)
}

/// Zero-based `(row, column)` of an `A1`-style cell reference.
pub(crate) fn cell_position(reference: &str) -> Option<(u32, u32)> {
    let digits = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, number) = reference.split_at(digits);
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let col = letters
        .bytes()
        .try_fold(0u32, |col, b| col.checked_mul(26)?.checked_add(u32::from(b - b'A') + 1))?;
    let row = number.parse::<u32>().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}

/// The style index of every cell a worksheet part styles explicitly, keyed by position.
///
/// Cells without an `s` attribute use style 0 and are left out.
pub(crate) fn cell_styles<R: BufRead>(xml: R) -> quick_xml::Result<HashMap<(u32, u32), usize>> {
    let mut reader = Reader::from_reader(xml);
    let mut styles = HashMap::new();
    let (mut row, mut next_row, mut next_col) = (0u32, 0u32, 0u32);
    let mut buf = Vec::with_capacity(1024);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = attribute(&reader, &e, b"r")?
                        .and_then(|r| r.parse::<u32>().ok())
                        .and_then(|r| r.checked_sub(1))
                        .unwrap_or(next_row);
                    next_row = row + 1;
                    next_col = 0;
                }
                b"c" => {
                    let (cell_row, col) = attribute(&reader, &e, b"r")?
                        .and_then(|r| cell_position(&r))
                        .unwrap_or((row, next_col));
                    next_col = col + 1;
                    let style = attribute(&reader, &e, b"s")?.and_then(|s| s.parse::<usize>().ok());
                    if let Some(style) = style.filter(|&style| style > 0) {
                        styles.insert((cell_row, col), style);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(styles)
}

#[cfg(test)]
mod tests {
    use super::{cell_position, cell_styles, sheet_parts, NumberFormats};

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="dd/mm/yyyy"/>
    <numFmt numFmtId="165" formatCode="&quot;due &quot;yyyy"/>
  </numFmts>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0"/></cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="20" fontId="0" xfId="0" applyNumberFormat="1"><alignment horizontal="left"/></xf>
    <xf numFmtId="165" fontId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

    #[test]
    fn styles_resolve_custom_and_builtin_formats() {
        let formats = NumberFormats::parse(STYLES.as_bytes()).expect("Expected styles to parse");

        assert_eq!(formats.format(0), "General");
        assert_eq!(formats.format(1), "dd/mm/yyyy");
        assert_eq!(formats.format(2), "h:mm");
        assert_eq!(formats.format(3), "\"due \"yyyy");
        assert_eq!(formats.format(9), "General", "Expected unknown styles to fall back to General");
    }

    #[test]
    fn sheet_parts_follow_workbook_order() {
        let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="b" sheetId="2" r:id="rId7"/>
    <sheet name="a" sheetId="1" r:id="rId1"/>
    <sheet name="lost" sheetId="3" r:id="rId9"/>
  </sheets>
</workbook>"#;
        let rels = r#"<Relationships>
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId7" Type="worksheet" Target="/xl/worksheets/sheet2.xml"/>
</Relationships>"#;

        let parts = sheet_parts(workbook.as_bytes(), rels.as_bytes()).expect("Expected parts to parse");
        assert_eq!(parts, vec![
            Some("xl/worksheets/sheet2.xml".to_string()),
            Some("xl/worksheets/sheet1.xml".to_string()),
            None,
        ]);
    }

    #[test]
    fn cell_references_are_zero_based() {
        assert_eq!(cell_position("A1"), Some((0, 0)));
        assert_eq!(cell_position("C12"), Some((11, 2)));
        assert_eq!(cell_position("AA3"), Some((2, 26)));
        assert_eq!(cell_position("12"), None);
        assert_eq!(cell_position("A0"), None);
    }

    #[test]
    fn cell_styles_follow_references_and_document_order() {
        let sheet = r#"<worksheet><sheetData>
  <row r="2"><c r="B2" s="1"><v>45358</v></c><c s="2"><v>0.5</v></c><c r="E2"><v>1</v></c></row>
  <row><c s="3" t="s"><v>0</v></c></row>
</sheetData></worksheet>"#;

        let styles = cell_styles(sheet.as_bytes()).expect("Expected sheet to parse");
        assert_eq!(styles.len(), 3, "Expected unstyled cells to be left out: {:?}", styles);
        assert_eq!(styles.get(&(1, 1)), Some(&1));
        assert_eq!(styles.get(&(1, 2)), Some(&2));
        assert_eq!(styles.get(&(2, 0)), Some(&3));
    }
}
