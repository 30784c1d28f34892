use crate::row::Row;
use crate::source::RowSource;
use crate::sources::xlsx::date_format::{is_date_format, DateRenderer};
use crate::sources::xlsx::{FormattedCell, ModernSheet, ModernWorkbook};
use crate::sources::{SourceError, SourceResult};
use std::vec;
use tracing::trace;

/// Iterates a zipped-XML sheet, rendering date-formatted cells as `YYYYMMDD`.
pub struct XlsxRows {
    rows: vec::IntoIter<Option<Vec<FormattedCell>>>,
    dates: DateRenderer,
    line: usize,
    done: bool,
}

impl XlsxRows {
    pub fn new(sheet: ModernSheet) -> Self {
        Self {
            rows: sheet.rows.into_iter(),
            dates: DateRenderer::new(),
            line: 0,
            done: false,
        }
    }

    fn render(&mut self, cell: FormattedCell) -> SourceResult<String> {
        if !is_date_format(&cell.format) {
            return Ok(cell.value);
        }
        match self.dates.render(&cell.value, &cell.format) {
            Ok(date) => Ok(date),
            Err((pattern, source)) => Err(SourceError::Date {
                value: cell.value,
                pattern,
                format: cell.format,
                source,
            }),
        }
    }
}

impl Iterator for XlsxRows {
    type Item = SourceResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let cells = loop {
            match self.rows.next()? {
                Some(cells) => break cells,
                None => trace!(line = self.line, "skipping undefined row"),
            }
        };

        let mut values = Vec::with_capacity(cells.len());
        for cell in cells {
            match self.render(cell) {
                Ok(value) => values.push(value),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        let row = Row::new(self.line, values);
        self.line += 1;
        Some(Ok(row))
    }
}

/// One sheet of a zipped-XML workbook.
pub struct XlsxSource<W> {
    workbook: W,
    sheet: usize,
}

impl<W: ModernWorkbook> XlsxSource<W> {
    pub fn new(workbook: W, sheet: usize) -> Self {
        Self { workbook, sheet }
    }
}

impl<W: ModernWorkbook> RowSource for XlsxSource<W> {
    type Rows = XlsxRows;

    fn rows(mut self) -> SourceResult<Self::Rows> {
        let count = self.workbook.sheet_count();
        if count == 0 {
            return Err(SourceError::InvalidFormat("file contains no sheets".into()));
        }
        if self.sheet >= count {
            return Err(SourceError::InvalidFormat(format!(
                "no sheet {} available, please select a sheet between 0 and {}",
                self.sheet,
                count - 1
            )));
        }
        Ok(XlsxRows::new(self.workbook.sheet(self.sheet)?))
    }
}

#[cfg(test)]
pub mod test_utils {
    use crate::sources::xlsx::{ModernSheet, ModernWorkbook};
    use crate::sources::SourceResult;

    /// An in-memory workbook.
    pub struct Sheets(pub Vec<ModernSheet>);

    impl ModernWorkbook for Sheets {
        fn sheet_count(&self) -> usize {
            self.0.len()
        }

        fn sheet(&mut self, index: usize) -> SourceResult<ModernSheet> {
            Ok(self.0.swap_remove(index))
        }
    }
}
