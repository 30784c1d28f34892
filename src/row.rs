use std::fmt::{Display, Formatter};

/// A single record read from a source, normalized to positional string values.
///
/// `line` is the producer's row counter: the emission index for CSV and XLSX sources, the raw
/// source row index for XLS sources (which may therefore have gaps where empty rows were
/// skipped).
#[derive(serde::Serialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct Row {
    line: usize,
    values: Vec<String>,
}

impl Row {
    pub fn new(line: usize, values: Vec<String>) -> Self {
        Self { line, values }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?}", self.line, self.values)
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::Row;

    /// Builds a row from string slices.
    pub fn row(line: usize, values: &[&str]) -> Row {
        Row::new(line, values.iter().map(|v| v.to_string()).collect())
    }
}
