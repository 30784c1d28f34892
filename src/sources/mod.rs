use crate::options::ReadOptions;
use crate::row::Row;
use crate::source::RowSource;
use crate::sources::csv::CsvSource;
use crate::sources::xls::XlsSource;
use crate::sources::xlsx::XlsxSource;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod cell;
pub mod csv;
pub mod xls;
pub mod xlsx;

pub type SourceResult<T> = Result<T, SourceError>;

/// Boxed cause reported by an external decoder.
pub type DecoderError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum SourceError {
    /// The file or container could not be opened or decoded.
    #[error("open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: DecoderError,
    },

    #[error("error reading input: {0}")]
    Io(#[from] io::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("error processing csv: {0}")]
    Csv(#[from] ::csv::Error),

    /// A quoted field is never closed.
    #[error("error processing csv: unbalanced quote in record starting at line {line}")]
    UnbalancedQuote { line: u64 },

    /// A quote inside an unquoted field, or text after the closing quote of a quoted one.
    #[error("error processing csv: stray quote in record starting at line {line}")]
    StrayQuote { line: u64 },

    #[error("parse {value:?} as {pattern:?} (from {format:?}): {source}")]
    Date {
        value: String,
        pattern: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("reading cancelled")]
    Cancelled,
}

/// Coarse classification of a [`SourceError`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// Bad path, unreadable stream or corrupt container.
    OpenFailure,
    /// No sheets, sheet index out of range, no usable delimiter.
    InvalidFormat,
    /// Malformed record or a cell that does not match its inferred date pattern.
    ParseFailure,
    Cancelled,
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Open { .. } | SourceError::Io(_) => ErrorKind::OpenFailure,
            SourceError::Csv(err) if matches!(err.kind(), ::csv::ErrorKind::Io(_)) => {
                ErrorKind::OpenFailure
            }
            SourceError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            SourceError::Csv(_)
            | SourceError::UnbalancedQuote { .. }
            | SourceError::StrayQuote { .. }
            | SourceError::Date { .. } => {
                ErrorKind::ParseFailure
            }
            SourceError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn open(path: &Path, source: impl Into<DecoderError>) -> Self {
        SourceError::Open { path: path.to_path_buf(), source: source.into() }
    }
}

/// The tabular formats a [`RowSource`] can be built for.
#[derive(clap::ValueEnum, Debug, PartialEq, Eq, Clone, Copy)]
pub enum SourceFormat {
    /// Delimited text.
    Csv,
    /// Legacy binary spreadsheet.
    Xls,
    /// Zipped-XML spreadsheet.
    Xlsx,
}

impl SourceFormat {
    /// Picks the format from the file extension, falling back to delimited text.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xls") => SourceFormat::Xls,
            Some("xlsx") | Some("xlsm") => SourceFormat::Xlsx,
            _ => SourceFormat::Csv,
        }
    }
}

/// A row source of any supported format, as chosen by [`detect_source`].
pub enum AnySource {
    Csv(CsvSource<Box<dyn io::Read + Send>>),
    Xls(XlsSource<xls::CalamineXls>),
    Xlsx(XlsxSource<xlsx::CalamineXlsx>),
}

impl RowSource for AnySource {
    type Rows = Box<dyn Iterator<Item=SourceResult<Row>> + Send>;

    fn rows(self) -> SourceResult<Self::Rows> {
        Ok(match self {
            AnySource::Csv(source) => Box::new(source.rows()?),
            AnySource::Xls(source) => Box::new(source.rows()?),
            AnySource::Xlsx(source) => Box::new(source.rows()?),
        })
    }
}

/// Opens `path` with the row source matching `options.format`, or its extension when unset.
pub fn detect_source(path: &Path, options: &ReadOptions) -> SourceResult<AnySource> {
    let format = options.format.unwrap_or_else(|| SourceFormat::from_path(path));
    tracing::debug!(path = %path.display(), ?format, sheet = options.sheet, "opening row source");
    Ok(match format {
        SourceFormat::Csv => {
            let file = File::open(path).map_err(|err| SourceError::open(path, err))?;
            let input: Box<dyn io::Read + Send> = Box::new(file);
            AnySource::Csv(CsvSource::with_options(input, options))
        }
        SourceFormat::Xls => {
            let workbook = xls::CalamineXls::open(path, options.charset.as_deref())?;
            AnySource::Xls(XlsSource::new(workbook, options.sheet))
        }
        SourceFormat::Xlsx => {
            let workbook = xlsx::CalamineXlsx::open(path)?;
            AnySource::Xlsx(XlsxSource::new(workbook, options.sheet))
        }
    })
}
