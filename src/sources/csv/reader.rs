use crate::options::ReadOptions;
use crate::row::Row;
use crate::source::RowSource;
use crate::sources::csv::quote_tap::{QuoteFault, QuoteTap};
use crate::sources::csv::sniff::{parse_delimiter, sniff_delimiter, Sniffed};
use crate::sources::{SourceError, SourceResult};
use csv::{Reader, StringRecord};
use std::io::{self, Read};
use tracing::debug;

type Input<R> = QuoteTap<io::Chain<io::Cursor<Vec<u8>>, R>>;

/// Iterates the records of delimited text as [`Row`]s numbered from zero.
pub struct CsvRows<R> {
    reader: Reader<Input<R>>,
    record: StringRecord,
    delimiter: u8,
    line: usize,
    sniffed: Option<Sniffed>,
    done: bool,
}

impl<R> CsvRows<R> {
    /// The sniffing outcome, when the delimiter was not configured.
    pub fn sniffed(&self) -> Option<&Sniffed> {
        self.sniffed.as_ref()
    }
}

impl<R: io::Read> Iterator for CsvRows<R> {
    type Item = SourceResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.record) {
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                let (start, line) = self
                    .record
                    .position()
                    .map_or((0, 0), |pos| (pos.byte(), pos.line()));
                let end = self.reader.position().byte();
                if let Err(fault) = self.reader.get_mut().take_record(start, end, self.delimiter) {
                    self.done = true;
                    return Some(Err(match fault {
                        QuoteFault::Unterminated => SourceError::UnbalancedQuote { line },
                        QuoteFault::Stray => SourceError::StrayQuote { line },
                    }));
                }
                let row = Row::new(self.line, self.record.iter().map(str::to_owned).collect());
                self.line += 1;
                Some(Ok(row))
            }
        }
    }
}

/// Delimited text read from any byte stream.
pub struct CsvSource<R> {
    input: R,
    delimiter: Option<String>,
    sniff_len: usize,
    flexible: bool,
}

impl<R> CsvSource<R>
where
    R: io::Read,
{
    pub fn new(input: R) -> Self {
        Self::with_options(input, &ReadOptions::default())
    }

    pub fn with_options(input: R, options: &ReadOptions) -> Self {
        Self {
            input,
            delimiter: options.delimiter.clone(),
            sniff_len: options.sniff_len,
            flexible: options.flexible,
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }
}

impl<R> RowSource for CsvSource<R>
where
    R: io::Read,
{
    type Rows = CsvRows<R>;

    fn rows(self) -> SourceResult<Self::Rows> {
        let mut input = self.input;
        let configured = match self.delimiter.as_deref() {
            Some(delimiter) => parse_delimiter(delimiter)?,
            None => None,
        };

        // The peeked prefix is replayed in front of the rest of the stream.
        let mut prefix = Vec::new();
        let (delimiter, sniffed) = match configured {
            Some(delimiter) => (delimiter, None),
            None => {
                (&mut input).take(self.sniff_len as u64).read_to_end(&mut prefix)?;
                let sniffed = sniff_delimiter(&prefix)?;
                (sniffed.delimiter, Some(sniffed))
            }
        };
        debug!(delimiter = ?(delimiter as char), sniffed = sniffed.is_some(), "reading csv");

        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(self.flexible)
            .delimiter(delimiter)
            .from_reader(QuoteTap::new(io::Cursor::new(prefix).chain(input)));
        Ok(CsvRows {
            reader,
            record: StringRecord::new(),
            delimiter,
            line: 0,
            sniffed,
            done: false,
        })
    }
}
