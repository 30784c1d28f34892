use crate::row::Row;
use crate::source::RowSource;
use crate::sources::xls::{ColumnSpan, LegacySheet, LegacyWorkbook};
use crate::sources::{SourceError, SourceResult};
use std::iter::Enumerate;
use std::vec;
use tracing::trace;

/// Iterates a legacy sheet, laying each row's column spans out by position.
///
/// Rows are at least as wide as the widest row seen so far in the sheet; narrower rows are
/// padded with empty strings. `Row::line` is the source row index.
pub struct XlsRows {
    rows: Enumerate<vec::IntoIter<Option<Vec<ColumnSpan>>>>,
    width: usize,
}

impl XlsRows {
    pub fn new(sheet: LegacySheet) -> Self {
        Self { rows: sheet.rows.into_iter().enumerate(), width: 0 }
    }

    fn lay_out(&mut self, spans: Vec<ColumnSpan>) -> Vec<String> {
        let mut values = vec![String::new(); self.width];
        for span in spans {
            if values.len() < span.end_col() {
                self.width = span.end_col();
                values.resize(self.width, String::new());
            }
            let first = span.first_col;
            for (offset, value) in span.values.into_iter().enumerate() {
                values[first + offset] = value;
            }
        }
        values
    }
}

impl Iterator for XlsRows {
    type Item = SourceResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.rows.next()? {
                (line, None) => trace!(line, "skipping undefined row"),
                (line, Some(spans)) => return Some(Ok(Row::new(line, self.lay_out(spans)))),
            }
        }
    }
}

/// One sheet of a legacy binary workbook.
pub struct XlsSource<W> {
    workbook: W,
    sheet: usize,
}

impl<W: LegacyWorkbook> XlsSource<W> {
    pub fn new(workbook: W, sheet: usize) -> Self {
        Self { workbook, sheet }
    }
}

impl<W: LegacyWorkbook> RowSource for XlsSource<W> {
    type Rows = XlsRows;

    fn rows(mut self) -> SourceResult<Self::Rows> {
        match self.workbook.sheet(self.sheet)? {
            Some(sheet) => Ok(XlsRows::new(sheet)),
            None => Err(SourceError::InvalidFormat(format!(
                "workbook does not contain sheet no {}", self.sheet
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::XlsSource;
    use crate::row::test_utils::row;
    use crate::row::Row;
    use crate::source::RowSource;
    use crate::sources::xls::{ColumnSpan, LegacySheet, LegacyWorkbook};
    use crate::sources::{ErrorKind, SourceResult};

    struct Sheets(Vec<LegacySheet>);

    impl LegacyWorkbook for Sheets {
        fn sheet(&mut self, index: usize) -> SourceResult<Option<LegacySheet>> {
            Ok((index < self.0.len()).then(|| self.0.swap_remove(index)))
        }
    }

    fn span(first_col: usize, values: &[&str]) -> ColumnSpan {
        ColumnSpan::new(first_col, values.iter().map(|v| v.to_string()).collect())
    }

    fn read(rows: Vec<Option<Vec<ColumnSpan>>>) -> Vec<Row> {
        XlsSource::new(Sheets(vec![LegacySheet { rows }]), 0)
            .rows()
            .expect("Expected sheet to open")
            .collect::<SourceResult<Vec<_>>>()
            .expect("Expected every row to be read")
    }

    #[test]
    fn gaps_between_spans_are_padded() {
        let rows = read(vec![Some(vec![span(0, &["a", "b"]), span(5, &["f"])])]);
        assert_eq!(rows, vec![row(0, &["a", "b", "", "", "", "f"])]);
    }

    #[test]
    fn spans_may_arrive_out_of_order() {
        let rows = read(vec![Some(vec![span(3, &["d"]), span(0, &["a"]), span(1, &["b", "c"])])]);
        assert_eq!(rows, vec![row(0, &["a", "b", "c", "d"])]);
    }

    #[test]
    fn width_persists_across_rows() {
        let rows = read(vec![
            Some(vec![span(0, &["a"])]),
            Some(vec![span(0, &["b", "c", "d"])]),
            Some(vec![span(1, &["e"])]),
        ]);
        assert_eq!(rows, vec![
            row(0, &["a"]),
            row(1, &["b", "c", "d"]),
            row(2, &["", "e", ""]),
        ]);
    }

    #[test]
    fn line_is_the_source_row_index() {
        let rows = read(vec![None, Some(vec![span(0, &["a"])]), None, None, Some(vec![span(0, &["b"])])]);
        assert_eq!(rows, vec![row(1, &["a"]), row(4, &["b"])]);
    }

    #[test]
    fn defined_row_without_spans_is_emitted() {
        let rows = read(vec![Some(vec![span(0, &["a", "b"])]), Some(vec![])]);
        assert_eq!(rows, vec![row(0, &["a", "b"]), row(1, &["", ""])]);
    }

    #[test]
    fn missing_sheet_is_invalid() {
        let source = XlsSource::new(Sheets(vec![LegacySheet::default()]), 1);
        let result = source.rows();
        let kind = result.as_ref().err().map(|err| err.kind());
        assert_eq!(kind, Some(ErrorKind::InvalidFormat));
        assert!(result.err().is_some_and(|err| err.to_string().contains("sheet no 1")),
                "Expected error to name the sheet index");
    }
}
