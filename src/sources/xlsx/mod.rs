use crate::sources::SourceResult;

mod styles;
mod workbook;
pub mod date_format;
pub mod reader;

pub use workbook::CalamineXlsx;
pub use reader::{XlsxRows, XlsxSource};

/// A cell as displayed by a zipped-XML spreadsheet: its number format and rendered text.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct FormattedCell {
    pub format: String,
    pub value: String,
}

impl FormattedCell {
    pub fn new(format: impl Into<String>, value: impl Into<String>) -> Self {
        Self { format: format.into(), value: value.into() }
    }

    /// A cell in the default `General` number format.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(styles::GENERAL, value)
    }
}

/// The rows of one sheet. `None` marks a row the file does not define.
#[derive(Debug, Default, Clone)]
pub struct ModernSheet {
    pub rows: Vec<Option<Vec<FormattedCell>>>,
}

/// Access to a zipped-XML workbook's ordered sheets.
pub trait ModernWorkbook {
    fn sheet_count(&self) -> usize;

    /// Loads the sheet at `index`, which is below [`sheet_count`](Self::sheet_count).
    fn sheet(&mut self, index: usize) -> SourceResult<ModernSheet>;
}
