use crate::pipeline::CancelToken;
use crate::row::Row;
use crate::sources::{SourceError, SourceResult};
use std::sync::mpsc::SyncSender;
use tracing::{debug, warn};

pub trait RowSource {
    type Rows: Iterator<Item=SourceResult<Row>>;

    /// Opens the source and returns its rows in source order.
    ///
    /// Conditions that can be detected before the first row (unreadable file, missing sheet,
    /// undetectable delimiter) are reported here. Once the returned iterator yields an error it
    /// yields nothing further; rows delivered before it stay valid.
    fn rows(self) -> SourceResult<Self::Rows>;

    /// Sends every row to `output`, blocking while the channel is full.
    ///
    /// Returns the number of rows sent. Stops with [`SourceError::Cancelled`] when `cancel`
    /// fires or the receiving side hangs up.
    fn send_to(self, output: &SyncSender<Row>, cancel: &CancelToken) -> SourceResult<usize>
    where
        Self: Sized,
    {
        let mut sent = 0;
        for row in self.rows()? {
            if cancel.is_cancelled() {
                debug!(rows.sent = sent, "row source cancelled");
                return Err(SourceError::Cancelled);
            }
            let row = row.inspect_err(|err| {
                warn!(rows.sent = sent, error = %err, "row source terminated early");
            })?;
            if output.send(row).is_err() {
                debug!(rows.sent = sent, "row consumer hung up");
                return Err(SourceError::Cancelled);
            }
            sent += 1;
        }
        debug!(rows.sent = sent, "row source exhausted");
        Ok(sent)
    }
}
