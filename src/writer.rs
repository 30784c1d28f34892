use crate::row::Row;
use crate::sources::SourceResult;
use std::io;

/// Dumps rows as tab-separated lines, each prefixed with its line number.
pub struct RowWriter<W>
where
    W: io::Write,
{
    writer: csv::Writer<W>,
}

impl<W> RowWriter<W>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(b'\t')
            .from_writer(writer);
        Self { writer }
    }

    /// Writes every row and returns how many were written.
    pub fn write_all<I>(&mut self, rows: I) -> SourceResult<usize>
    where
        I: IntoIterator<Item=Row>,
    {
        let mut written = 0;
        for row in rows {
            self.writer.serialize(&row)?;
            written += 1;
        }
        self.writer.flush()?;
        Ok(written)
    }
}
