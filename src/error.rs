//! Error types.
//!
//! Application-level failures (config files, command plumbing) are `anyhow::Error`. Loading a
//! transaction table has its own typed error, `LoadError`, so that callers can tell a file that
//! is not a usable table apart from a table with a bad row.

use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The reasons a transaction table can fail to load. A load either succeeds for every row or fails
/// with one of these; rows are never silently dropped.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input could not be read as a delimited table, e.g. a row has the wrong number of fields.
    #[error("The file is not a valid delimited table: {0}")]
    Table(#[from] csv::Error),

    /// One or more of the required columns is absent from the header row.
    #[error("The file is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required column appears more than once in the header row.
    #[error("The column '{0}' appears more than once in the header row")]
    DuplicateColumn(String),

    /// A row has a value that cannot be parsed into its column's type.
    #[error("Row {row} (line {line}): invalid {column} '{value}': {reason}")]
    Parse {
        /// 1-based index of the data row (the header is not counted).
        row: usize,
        /// Line number in the file, as reported by the CSV reader.
        line: u64,
        column: String,
        value: String,
        reason: String,
    },
}

impl LoadError {
    /// True when the table itself is unusable, as opposed to a single row being bad.
    pub fn is_ingestion(&self) -> bool {
        !self.is_parse()
    }

    /// True when a specific row held an unparseable date or amount.
    pub fn is_parse(&self) -> bool {
        matches!(self, LoadError::Parse { .. })
    }

    /// The 1-based data row that failed, if the error is about a row.
    pub fn row(&self) -> Option<usize> {
        match self {
            LoadError::Parse { row, .. } => Some(*row),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let e = LoadError::MissingColumns(vec!["Date".into(), "Amount".into()]);
        assert_eq!(
            e.to_string(),
            "The file is missing required column(s): Date, Amount"
        );
        assert!(e.is_ingestion());
        assert_eq!(e.row(), None);
    }

    #[test]
    fn test_parse_message_names_the_row() {
        let e = LoadError::Parse {
            row: 3,
            line: 4,
            column: "Amount".into(),
            value: "abc".into(),
            reason: "not a number".into(),
        };
        assert!(e.is_parse());
        assert_eq!(e.row(), Some(3));
        assert_eq!(
            e.to_string(),
            "Row 3 (line 4): invalid Amount 'abc': not a number"
        );
    }
}
