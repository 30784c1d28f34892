//! Guesses the field delimiter of delimited text from the first bytes of the stream.
//!
//! The heuristic is deliberately coarse: it assumes the first non-alphanumeric, non-quote
//! character near the start of the data is the delimiter and does no frequency analysis.

use crate::sources::{SourceError, SourceResult};
use tracing::info;

/// How many candidate characters are kept for diagnostics.
const MAX_CANDIDATES: usize = 4;

/// Outcome of sniffing a delimiter.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Sniffed {
    /// The leading separator candidates that were considered.
    pub candidates: String,
    pub delimiter: u8,
}

/// Infers a delimiter from `prefix`.
///
/// Letters, digits and `"` are dropped; leading spaces are skipped unless nothing else is left.
/// The first remaining character is the delimiter.
pub fn sniff_delimiter(prefix: &[u8]) -> SourceResult<Sniffed> {
    let text = String::from_utf8_lossy(prefix);
    let separators = text
        .chars()
        .filter(|c| *c != '"' && !c.is_alphanumeric())
        .collect::<String>();

    let trimmed = separators.trim_start_matches(' ');
    let trimmed = if trimmed.is_empty() && !separators.is_empty() { " " } else { trimmed };
    let candidates = trimmed.chars().take(MAX_CANDIDATES).collect::<String>();

    let delimiter = match candidates.chars().next() {
        None => {
            return Err(SourceError::InvalidFormat(
                "no delimiter could be inferred: input holds no separator characters".into(),
            ));
        }
        Some(c @ ('\r' | '\n')) => {
            return Err(SourceError::InvalidFormat(format!(
                "no delimiter could be inferred: first separator candidate is {:?}", c
            )));
        }
        Some(c) => single_byte(c)?,
    };

    info!(candidates = ?candidates, delimiter = ?(delimiter as char), "sniffed csv delimiter");
    Ok(Sniffed { candidates, delimiter })
}

/// Resolves an explicitly configured delimiter. Only its first character counts.
pub fn parse_delimiter(delimiter: &str) -> SourceResult<Option<u8>> {
    delimiter.chars().next().map(single_byte).transpose()
}

fn single_byte(c: char) -> SourceResult<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| SourceError::InvalidFormat(format!("delimiter {:?} is not a single-byte character", c)))
}
