use crate::sources::SourceFormat;

/// Number of bytes inspected when a CSV delimiter has to be guessed.
pub const DEFAULT_SNIFF_LEN: usize = 1024;

/// Per-call settings shared by all row sources.
///
/// Settings that do not apply to a format are ignored by it, e.g. `charset` only matters for
/// legacy binary spreadsheets and `delimiter` only for delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Overrides the format detected from the file extension.
    pub format: Option<SourceFormat>,

    /// Field delimiter of delimited text. `None` or an empty string means it is sniffed from the
    /// start of the stream.
    pub delimiter: Option<String>,

    /// Encoding label used to decode the text of legacy spreadsheets, e.g. `windows-1250`.
    pub charset: Option<String>,

    /// Zero-based index into the workbook's ordered sheet list.
    pub sheet: usize,

    /// How many leading bytes the delimiter sniffer looks at.
    pub sniff_len: usize,

    /// Accept delimited records with differing field counts.
    pub flexible: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            charset: None,
            sheet: 0,
            sniff_len: DEFAULT_SNIFF_LEN,
            flexible: false,
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = sheet;
        self
    }

    #[must_use]
    pub fn with_sniff_len(mut self, sniff_len: usize) -> Self {
        self.sniff_len = sniff_len;
        self
    }

    #[must_use]
    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }
}
