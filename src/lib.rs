// #![deny(clippy::missing_errors_doc)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::missing_assert_message)]

//! Reads delimited text, legacy binary spreadsheets and zipped-XML spreadsheets as one uniform
//! stream of string-valued [`Row`]s.
//!
//! Every format is a [`RowSource`](source::RowSource). Pick one explicitly or let
//! [`detect_source`](sources::detect_source) choose by extension, then either pull rows through
//! [`RowSource::rows`](source::RowSource::rows) or push them onto a channel with
//! [`pipeline::spawn`].

pub mod options;
pub mod pipeline;
pub mod row;
pub mod source;
pub mod sources;
pub mod writer;

pub use options::ReadOptions;
pub use row::Row;
pub use sources::{ErrorKind, SourceError, SourceResult};
