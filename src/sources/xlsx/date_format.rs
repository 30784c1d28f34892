//! Translates spreadsheet display formats into `chrono` parse patterns.
//!
//! Spreadsheet formats overload `mm` for both month and minute. The table below resolves it by
//! the surrounding punctuation only (`mm:` and `:mm` are minutes, any other `mm` is a month),
//! which is not a full format grammar and misreads formats such as `mm.ss`.

use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt::Write;

/// Canonical rendering of a date cell.
pub const CANONICAL_DATE: &str = "%Y%m%d";

/// Ordered substring rules. Each rule rewrites every occurrence before the next rule runs.
const RULES: [(&str, &str); 15] = [
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("dd", "%d"),
    ("d", "%d"),
    ("mmm", "%b"),
    ("mmss", "%M%S"),
    ("ss", "%S"),
    ("hh", "%H"),
    ("h", "%I"),
    ("mm:", "%M:"),
    (":mm", ":%M"),
    ("mm", "%m"),
    ("am/pm", "%p"),
    ("m/", "%m/"),
    (".0", "%.f"),
];

/// Whether a display format renders a date.
pub fn is_date_format(format: &str) -> bool {
    format.contains("yy") || format.contains("mm") || format.contains("dd")
}

enum Piece<'a> {
    Source(&'a str),
    Pattern(&'static str),
}

/// Rewrites `format` into a pattern understood by [`chrono::format::strftime`].
///
/// Text already produced by a rule is never matched by a later one. A literal `%` in the display
/// format is escaped.
pub fn translate(format: &str) -> String {
    let mut pieces = vec![Piece::Source(format)];
    for (token, pattern) in RULES {
        pieces = pieces
            .into_iter()
            .flat_map(|piece| match piece {
                Piece::Source(text) => split_on(text, token, pattern),
                done => vec![done],
            })
            .collect();
    }

    let mut translated = String::with_capacity(format.len() + 8);
    for piece in pieces {
        match piece {
            Piece::Source(text) => translated.push_str(&text.replace('%', "%%")),
            Piece::Pattern(pattern) => translated.push_str(pattern),
        }
    }
    translated
}

fn split_on<'a>(text: &'a str, token: &str, pattern: &'static str) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find(token) {
        if at > 0 {
            pieces.push(Piece::Source(&rest[..at]));
        }
        pieces.push(Piece::Pattern(pattern));
        rest = &rest[at + token.len()..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Source(rest));
    }
    pieces
}

/// Parses `value` with a translated `pattern` and returns its date.
///
/// Date fields missing from the pattern default to year 0, January and the first day.
pub fn parse_date(value: &str, pattern: &str) -> Result<NaiveDate, chrono::ParseError> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, value, StrftimeItems::new(pattern))?;
    if parsed.year().is_none() && parsed.year_mod_100().is_none() && parsed.year_div_100().is_none() {
        parsed.set_year(0)?;
    }
    if parsed.month().is_none() {
        parsed.set_month(1)?;
    }
    if parsed.day().is_none() {
        parsed.set_day(1)?;
    }
    parsed.to_naive_date()
}

/// Renders date-formatted cells canonically, remembering each distinct translation.
#[derive(Debug, Default)]
pub struct DateRenderer {
    patterns: HashMap<String, String>,
}

impl DateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The translated pattern for `format`.
    pub fn pattern(&mut self, format: &str) -> &str {
        self.patterns
            .entry(format.to_owned())
            .or_insert_with(|| translate(format))
    }

    /// Displays `value` the way a cell formatted with `format` shows it, or `None` when the
    /// translated pattern cannot be formatted.
    pub fn display(&mut self, value: NaiveDateTime, format: &str) -> Option<String> {
        let pattern = self.pattern(format);
        let mut text = String::new();
        write!(text, "{}", value.format(pattern)).ok()?;
        Some(text)
    }

    /// Parses `value` as displayed under `format` and renders it as `YYYYMMDD`.
    pub fn render(&mut self, value: &str, format: &str) -> Result<String, (String, chrono::ParseError)> {
        let pattern = self.pattern(format);
        match parse_date(value, pattern) {
            Ok(date) => Ok(date.format(CANONICAL_DATE).to_string()),
            Err(err) => Err((pattern.to_owned(), err)),
        }
    }
}
