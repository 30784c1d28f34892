use std::io;

/// How a record misplaces its quote characters.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum QuoteFault {
    /// A quoted field is never closed.
    Unterminated,
    /// A quote neither opens a field nor closes or escapes within a quoted one.
    Stray,
}

/// Passes bytes through unchanged while keeping the raw bytes of records not yet checked.
///
/// The csv parser silently closes a quoted field at end of input and keeps stray quotes as field
/// text. Checking each record's raw span against its parsed position reveals both.
pub(crate) struct QuoteTap<R> {
    inner: R,
    base: u64,
    pending: Vec<u8>,
}

impl<R> QuoteTap<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, base: 0, pending: Vec::new() }
    }

    /// Checks the quotes of the record within `start..end` and forgets every byte before `end`.
    pub(crate) fn take_record(&mut self, start: u64, end: u64, delimiter: u8) -> Result<(), QuoteFault> {
        let len = self.pending.len();
        let index = |offset: u64| usize::try_from(offset.saturating_sub(self.base)).map_or(len, |i| i.min(len));
        let to = index(end);
        let checked = check_quotes(&self.pending[index(start).min(to)..to], delimiter);
        self.pending.drain(..to);
        self.base += to as u64;
        checked
    }
}

/// Walks the quotes of one raw record: a quote opens a field, doubles inside a quoted field, or
/// closes it right before a delimiter or line end.
pub(crate) fn check_quotes(record: &[u8], delimiter: u8) -> Result<(), QuoteFault> {
    let is_boundary = |b: u8| b == delimiter || b == b'\r' || b == b'\n';
    let mut quotes = memchr::memchr_iter(b'"', record);
    while let Some(open) = quotes.next() {
        if open > 0 && !is_boundary(record[open - 1]) {
            return Err(QuoteFault::Stray);
        }
        loop {
            let close = quotes.next().ok_or(QuoteFault::Unterminated)?;
            match record.get(close + 1) {
                Some(&b'"') => {
                    quotes.next();
                }
                Some(&b) if !is_boundary(b) => return Err(QuoteFault::Stray),
                _ => break,
            }
        }
    }
    Ok(())
}

impl<R: io::Read> io::Read for QuoteTap<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pending.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}
