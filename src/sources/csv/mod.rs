mod quote_tap;
pub mod reader;
pub mod sniff;

pub use reader::{CsvRows, CsvSource};
pub use sniff::{sniff_delimiter, Sniffed};
