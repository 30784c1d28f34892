use crate::sources::SourceResult;

mod charset;
pub mod reader;
mod workbook;

pub use charset::codepage_for;
pub use reader::{XlsRows, XlsSource};
pub use workbook::CalamineXls;

/// Decoded strings of a run of adjacent cells, starting at column `first_col`.
///
/// Legacy spreadsheets store a row as such runs, in no particular column order and without
/// necessarily covering the full row width.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColumnSpan {
    pub first_col: usize,
    pub values: Vec<String>,
}

impl ColumnSpan {
    pub fn new(first_col: usize, values: Vec<String>) -> Self {
        Self { first_col, values }
    }

    /// One past the last column covered by this span.
    pub fn end_col(&self) -> usize {
        self.first_col + self.values.len()
    }
}

/// The rows of one sheet, indexed by source row. `None` marks a row the file does not define.
#[derive(Debug, Default, Clone)]
pub struct LegacySheet {
    pub rows: Vec<Option<Vec<ColumnSpan>>>,
}

/// Access to the sheets of a legacy binary workbook.
pub trait LegacyWorkbook {
    /// Loads the sheet at `index`, or `None` when the workbook has no such sheet.
    fn sheet(&mut self, index: usize) -> SourceResult<Option<LegacySheet>>;
}
