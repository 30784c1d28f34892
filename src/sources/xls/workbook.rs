use crate::sources::cell::{cell_text, is_empty};
use crate::sources::xls::charset::codepage_for;
use crate::sources::xls::{ColumnSpan, LegacySheet, LegacyWorkbook};
use crate::sources::{SourceError, SourceResult};
use calamine::{Data, Reader, Xls, XlsOptions};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A legacy binary workbook decoded by `calamine`.
///
/// Text is decoded with the code page the file declares, unless a charset is forced on open.
pub struct CalamineXls {
    workbook: Xls<BufReader<File>>,
    path: PathBuf,
}

impl CalamineXls {
    pub fn open(path: &Path, charset: Option<&str>) -> SourceResult<Self> {
        let mut options = XlsOptions::default();
        if let Some(charset) = charset.filter(|c| !c.trim().is_empty()) {
            let codepage = codepage_for(charset)?;
            debug!(charset, codepage, "forcing xls code page");
            options.force_codepage = Some(codepage);
        }
        let file = File::open(path).map_err(|err| SourceError::open(path, err))?;
        let workbook = Xls::new_with_options(BufReader::new(file), options)
            .map_err(|err| SourceError::open(path, err))?;
        Ok(Self { workbook, path: path.to_path_buf() })
    }
}

/// Splits a row of cells into runs of adjacent non-empty cells.
pub(crate) fn column_spans(first_col: usize, cells: &[Data]) -> Vec<ColumnSpan> {
    let mut spans: Vec<ColumnSpan> = Vec::new();
    for (offset, cell) in cells.iter().enumerate() {
        if is_empty(cell) {
            continue;
        }
        let col = first_col + offset;
        match spans.last_mut() {
            Some(span) if span.end_col() == col => span.values.push(cell_text(cell)),
            _ => spans.push(ColumnSpan::new(col, vec![cell_text(cell)])),
        }
    }
    spans
}

impl LegacyWorkbook for CalamineXls {
    fn sheet(&mut self, index: usize) -> SourceResult<Option<LegacySheet>> {
        let range = match self.workbook.worksheet_range_at(index) {
            Some(range) => range.map_err(|err| SourceError::open(&self.path, err))?,
            None => return Ok(None),
        };
        let Some((first_row, first_col)) = range.start() else {
            return Ok(Some(LegacySheet::default()));
        };

        let mut rows = vec![None; first_row as usize];
        rows.extend(range.rows().map(|cells| {
            let spans = column_spans(first_col as usize, cells);
            (!spans.is_empty()).then_some(spans)
        }));
        Ok(Some(LegacySheet { rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::{column_spans, CalamineXls};
    use crate::row::test_utils::row;
    use crate::row::Row;
    use crate::source::RowSource;
    use crate::sources::xls::{ColumnSpan, XlsSource};
    use crate::sources::{ErrorKind, SourceResult};
    use calamine::Data;
    use std::path::Path;

    /// A BIFF5 workbook with one sheet: "ab" and 1 on row 1, "cd" on row 3 and the Windows-1252
    /// bytes "z\xB9" on row 4. Rows 0 and 2 hold no cells.
    const LAYOUT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/layout.xls");

    fn read_layout(charset: Option<&str>, sheet: usize) -> SourceResult<Vec<Row>> {
        let workbook = CalamineXls::open(Path::new(LAYOUT), charset)?;
        XlsSource::new(workbook, sheet).rows()?.collect()
    }

    #[test]
    fn adjacent_cells_share_a_span() {
        let cells = [
            Data::String("a".into()),
            Data::Float(1.0),
            Data::Empty,
            Data::Bool(false),
        ];
        assert_eq!(column_spans(2, &cells), vec![
            ColumnSpan::new(2, vec!["a".into(), "1".into()]),
            ColumnSpan::new(5, vec!["false".into()]),
        ]);
    }

    #[test]
    fn empty_row_has_no_spans() {
        assert!(column_spans(0, &[Data::Empty, Data::Empty]).is_empty(), "Expected no spans");
    }

    #[test]
    fn missing_file_is_an_open_failure() {
        let result = CalamineXls::open(Path::new("/nonexistent/book.xls"), None);
        let kind = result.err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::OpenFailure));
    }

    #[test]
    fn unknown_charset_is_rejected_before_opening() {
        let result = CalamineXls::open(Path::new("/nonexistent/book.xls"), Some("klingon"));
        let kind = result.err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn garbage_file_is_an_open_failure() {
        let mut file = tempfile::NamedTempFile::new().expect("Test setup: unable to create temp file");
        std::io::Write::write_all(&mut file, b"not a compound document")
            .expect("Test setup: unable to write temp file");

        let kind = CalamineXls::open(file.path(), Some("utf-8")).err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::OpenFailure));
    }

    #[test]
    fn checked_in_workbook_is_laid_out_by_position() {
        let rows = read_layout(None, 0).expect("Expected the fixture sheet to read");
        assert_eq!(rows, vec![
            row(1, &["", "ab", "1"]),
            row(3, &["", "", "", "cd"]),
            row(4, &["", "z\u{b9}", "", ""]),
        ]);
    }

    #[test]
    fn forced_charset_decodes_labels() {
        let rows = read_layout(Some("windows-1250"), 0).expect("Expected the fixture sheet to read");
        assert_eq!(rows.last(), Some(&row(4, &["", "z\u{105}", "", ""])),
                   "Expected 0xB9 to decode as Windows-1250: {:?}", rows);
    }

    #[test]
    fn missing_sheet_of_checked_in_workbook_is_invalid() {
        let kind = read_layout(None, 1).err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::InvalidFormat));
    }
}
