//! Reading a delimited text table into `Transactions`.
//!
//! The first record is the header. It must name the `Date`, `Category` and `Amount` columns (in
//! any order, ignoring case and surrounding whitespace); other columns are ignored. Every row must
//! parse or the whole load fails.

use crate::error::LoadError;
use crate::model::{Amount, Transaction, Transactions};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, trace};

pub const DATE_HEADER: &str = "Date";
pub const CATEGORY_HEADER: &str = "Category";
pub const AMOUNT_HEADER: &str = "Amount";

/// Date formats tried, in order, when no others are configured. Month-first is preferred over
/// day-first for slashed dates.
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Date-time forms whose time part is dropped.
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Settings that control how a table is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    delimiter: u8,
    date_formats: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl IngestOptions {
    pub fn new(delimiter: u8, date_formats: Vec<String>) -> Self {
        Self {
            delimiter,
            date_formats,
        }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn date_formats(&self) -> &[String] {
        &self.date_formats
    }

    /// Parses `s` with the first configured format that accepts it.
    pub fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        self.date_formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
            .or_else(|| {
                DATE_TIME_FORMATS
                    .iter()
                    .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                    .map(|dt| dt.date())
            })
    }
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    date: usize,
    category: usize,
    amount: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, LoadError> {
        let date = find_header(headers, DATE_HEADER)?;
        let category = find_header(headers, CATEGORY_HEADER)?;
        let amount = find_header(headers, AMOUNT_HEADER)?;
        match (date, category, amount) {
            (Some(date), Some(category), Some(amount)) => Ok(Self {
                date,
                category,
                amount,
            }),
            _ => {
                let missing = [
                    (date, DATE_HEADER),
                    (category, CATEGORY_HEADER),
                    (amount, AMOUNT_HEADER),
                ]
                .into_iter()
                .filter(|(ix, _)| ix.is_none())
                .map(|(_, name)| name.to_string())
                .collect();
                Err(LoadError::MissingColumns(missing))
            }
        }
    }
}

fn find_header(headers: &StringRecord, name: &str) -> Result<Option<usize>, LoadError> {
    let mut found = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().eq_ignore_ascii_case(name))
        .map(|(ix, _)| ix);
    let first = found.next();
    if found.next().is_some() {
        return Err(LoadError::DuplicateColumn(name.to_string()));
    }
    Ok(first)
}

/// Reads every row of the table in `reader`.
///
/// # Errors
/// - `LoadError::Table` if the input is not a well-formed delimited table.
/// - `LoadError::MissingColumns` or `LoadError::DuplicateColumn` for a bad header row.
/// - `LoadError::Parse` for the first row with a bad date or amount.
pub fn read_transactions<R: Read>(
    reader: R,
    options: &IngestOptions,
) -> Result<Transactions, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    trace!("Required columns found at {columns:?}");

    let mut transactions = Vec::new();
    for (ix, result) in rdr.records().enumerate() {
        let record = result?;
        transactions.push(parse_row(&record, ix + 1, columns, options)?);
    }

    debug!("Read {} transactions", transactions.len());
    Ok(Transactions::new(transactions))
}

fn parse_row(
    record: &StringRecord,
    row: usize,
    columns: Columns,
    options: &IngestOptions,
) -> Result<Transaction, LoadError> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let field = |ix: usize| record.get(ix).unwrap_or_default();
    let bad = |column: &str, value: &str, reason: String| LoadError::Parse {
        row,
        line,
        column: column.to_string(),
        value: value.to_string(),
        reason,
    };

    let date_text = field(columns.date);
    let date = options.parse_date(date_text).ok_or_else(|| {
        bad(
            DATE_HEADER,
            date_text,
            format!(
                "expected a date in one of the formats {}",
                options.date_formats.join(", ")
            ),
        )
    })?;

    let amount_text = field(columns.amount);
    let amount = Amount::from_str(amount_text)
        .map_err(|e| bad(AMOUNT_HEADER, amount_text, e.to_string()))?;

    Ok(Transaction::new(
        date,
        field(columns.category).trim(),
        amount,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{txn, SAMPLE_CSV};

    fn read(input: &str) -> Result<Transactions, LoadError> {
        read_transactions(input.as_bytes(), &IngestOptions::default())
    }

    #[test]
    fn test_read_sample() {
        let transactions = read(SAMPLE_CSV).unwrap();
        assert_eq!(transactions.len(), 6);
        assert_eq!(transactions.as_slice()[0], txn("2024-01-01", "Food", "-50"));
        assert_eq!(
            transactions.as_slice()[1],
            txn("2024-01-02", "Salary", "2000")
        );
    }

    #[test]
    fn test_column_order_case_and_extra_columns() {
        let input = " amount ,Notes,CATEGORY,date\n-$1,200.00,rent is due,Rent ,2024-02-01\n";
        let input = input.replace("-$1,200.00", "\"-$1,200.00\"");
        let transactions = read(&input).unwrap();
        assert_eq!(
            transactions.as_slice(),
            &[txn("2024-02-01", "Rent", "-1200.00")]
        );
    }

    #[test]
    fn test_header_only_is_empty() {
        let transactions = read("Date,Category,Amount\n").unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        let err = read("").unwrap_err();
        assert!(err.is_ingestion());
        match err {
            LoadError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["Date", "Category", "Amount"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let err = read("Date,Description,Amount\n2024-01-01,Coffee,-4.50\n").unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => assert_eq!(missing, vec!["Category"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_column() {
        let err = read("Date,Category,Amount,amount\n2024-01-01,Food,-1,-2\n").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumn(ref c) if c == "Amount"));
    }

    #[test]
    fn test_ragged_row_is_not_a_table() {
        let err = read("Date,Category,Amount\n2024-01-01,Food\n").unwrap_err();
        assert!(matches!(err, LoadError::Table(_)));
        assert!(err.is_ingestion());
    }

    #[test]
    fn test_bad_date_names_the_row() {
        let input = "Date,Category,Amount\n2024-01-01,Food,-50\nlast tuesday,Food,-5\n";
        let err = read(input).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(err.row(), Some(2));
        match err {
            LoadError::Parse {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Date");
                assert_eq!(value, "last tuesday");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_amount_names_the_row() {
        let input = "Date,Category,Amount\n2024-01-01,Food,-50\n2024-01-02,Food,\n";
        let err = read(input).unwrap_err();
        assert_eq!(err.row(), Some(2));
        assert!(err.to_string().contains("invalid Amount"));

        let input = "Date,Category,Amount\n2024-01-01,Food,fifty\n";
        let err = read(input).unwrap_err();
        assert_eq!(err.row(), Some(1));
    }

    #[test]
    fn test_doubled_sign_is_rejected() {
        for (amount, row) in [("--50", 1), ("-$-20", 1)] {
            let input = format!("Date,Category,Amount\n2024-01-01,Food,{amount}\n");
            match read(&input).unwrap_err() {
                LoadError::Parse {
                    row: r,
                    column,
                    value,
                    ..
                } => {
                    assert_eq!(r, row);
                    assert_eq!(column, AMOUNT_HEADER);
                    assert_eq!(value, amount);
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_amount_too_large_is_rejected() {
        let input = "Date,Category,Amount\n\
            2024-01-01,Food,-1000000000000\n\
            2024-01-02,Food,-79228162514264337593543950335\n";
        let err = read(input).unwrap_err();
        assert_eq!(err.row(), Some(2));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_no_partial_load() {
        // The good first row is not returned when a later row fails.
        let input = "Date,Category,Amount\n2024-01-01,Food,-50\n2024-13-45,Food,-5\n";
        assert!(read(input).is_err());
    }

    #[test]
    fn test_date_formats() {
        let options = IngestOptions::default();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7);
        assert_eq!(options.parse_date("2024-03-07"), expected);
        assert_eq!(options.parse_date("03/07/2024"), expected);
        assert_eq!(options.parse_date("2024/03/07"), expected);
        assert_eq!(options.parse_date("07.03.2024"), expected);
        assert_eq!(options.parse_date(" 2024-03-07 12:30:00 "), expected);
        assert_eq!(options.parse_date("2024-03-07T12:30:00"), expected);
        assert_eq!(options.parse_date("March 7th"), None);
    }

    #[test]
    fn test_custom_delimiter_and_formats() {
        let options = IngestOptions::new(b';', vec!["%d/%m/%Y".to_string()]);
        let input = "Date;Category;Amount\n07/03/2024;Food;-3,50\n";
        // "-3,50" loses its comma as a thousands separator
        let transactions = read_transactions(input.as_bytes(), &options).unwrap();
        assert_eq!(transactions.as_slice(), &[txn("2024-03-07", "Food", "-350")]);
    }
}
