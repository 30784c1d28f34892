//! Runs a [`RowSource`] on its own thread and hands its rows over a bounded channel.
//!
//! The producer blocks while the channel is full, so a slow consumer throttles the reader. The
//! consumer drains [`RowStream`] like any iterator and calls [`RowStream::finish`] to learn how
//! the sequence ended.

use crate::row::Row;
use crate::source::RowSource;
use crate::sources::SourceResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{info_span, Span};

/// A shared flag that asks a running producer to stop at the next row boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The consuming end of a spawned row source.
pub struct RowStream {
    receiver: Option<Receiver<Row>>,
    producer: JoinHandle<SourceResult<usize>>,
    cancel: CancelToken,
}

impl RowStream {
    /// Asks the producer to stop. Rows already in the channel can still be drained.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the producer and returns its terminal outcome: the number of rows sent, or the
    /// error that ended the sequence.
    ///
    /// Undrained rows are discarded, which unblocks a producer waiting on a full channel. A panic
    /// on the producer thread is resumed on the caller's thread.
    pub fn finish(mut self) -> SourceResult<usize> {
        drop(self.receiver.take());
        self.producer
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }
}

impl Iterator for RowStream {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.as_ref()?.recv().ok()
    }
}

/// Spawns `source` on a new thread that sends into a channel holding at most `capacity` rows.
pub fn spawn<S>(source: S, capacity: usize) -> RowStream
where
    S: RowSource + Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(capacity);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let parent = Span::current();
    let producer = thread::spawn(move || {
        let _span = info_span!(parent: &parent, "row_producer").entered();
        source.send_to(&sender, &token)
    });
    RowStream { receiver: Some(receiver), producer, cancel }
}

#[cfg(test)]
mod tests {
    use super::spawn;
    use crate::row::test_utils::row;
    use crate::row::Row;
    use crate::source::RowSource;
    use crate::sources::{SourceError, SourceResult};

    struct Counting(usize);

    impl RowSource for Counting {
        type Rows = Box<dyn Iterator<Item=SourceResult<Row>> + Send>;

        fn rows(self) -> SourceResult<Self::Rows> {
            Ok(Box::new((0..self.0).map(|n| Ok(row(n, &["x"])))))
        }
    }

    struct Refusing;

    impl RowSource for Refusing {
        type Rows = std::iter::Empty<SourceResult<Row>>;

        fn rows(self) -> SourceResult<Self::Rows> {
            Err(SourceError::InvalidFormat("file contains no sheets".into()))
        }
    }

    #[test]
    fn consumer_receives_all_rows_in_order() {
        let mut stream = spawn(Counting(100), 1);
        let lines = stream.by_ref().map(|r| r.line()).collect::<Vec<_>>();
        let result = stream.finish();

        assert_eq!(lines, (0..100).collect::<Vec<_>>());
        assert!(matches!(result, Ok(100)), "Expected all rows to be sent: {:?}", result);
    }

    #[test]
    fn up_front_error_is_reported_by_finish() {
        let mut stream = spawn(Refusing, 4);
        assert_eq!(stream.next(), None);
        let result = stream.finish();
        assert!(matches!(result, Err(SourceError::InvalidFormat(_))), "Expected invalid format: {:?}", result);
    }

    #[test]
    fn finishing_early_unblocks_the_producer() {
        let mut stream = spawn(Counting(1_000), 1);
        assert_eq!(stream.next(), Some(row(0, &["x"])));
        stream.cancel();
        let result = stream.finish();
        assert!(matches!(result, Err(SourceError::Cancelled)), "Expected cancellation: {:?}", result);
    }
}
