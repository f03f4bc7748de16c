//! CSV loader for batch conversion requests.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column                  | Required | Notes                                         |
//! |-------------------------|----------|-----------------------------------------------|
//! | `amount`                | yes      | e.g. `1500.00`; quote it to use `1,500.00`    |
//! | `direction`             | yes      | `gross_to_net` / `gross` or `net_to_gross` / `net` |
//! | `relief_category`       | no       | empty selects the policy default              |
//! | `supplementary_pension` | no       | `true`/`false`, `yes`/`no`, `1`/`0`; empty is `false` |
//!
//! ### Example
//!
//! ```csv
//! amount,direction,relief_category,supplementary_pension
//! 1500.00,gross,,
//! 960.62,net,standard,false
//! 2000,gross_to_net,none,yes
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use salary_core::{ConversionRequest, Direction};
use serde::Deserialize;
use thiserror::Error;

use crate::amount::{ParseAmountError, parse_amount};

#[derive(Debug, Deserialize)]
struct CsvRow {
    amount: String,
    direction: String,
    #[serde(default)]
    relief_category: Option<String>,
    #[serde(default)]
    supplementary_pension: Option<String>,
}

/// Errors that can occur while loading batch requests.
///
/// Row numbers are 1-based (header = row 0).
#[derive(Debug, Error)]
pub enum BatchLoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("row {row}: {source}")]
    InvalidAmount {
        row: usize,
        #[source]
        source: ParseAmountError,
    },

    #[error("row {row}: unrecognised direction '{value}'")]
    InvalidDirection { value: String, row: usize },

    #[error("row {row}: unrecognised supplementary_pension value '{value}'")]
    InvalidPension { value: String, row: usize },
}

fn parse_pension(
    value: Option<&str>,
    row: usize,
) -> Result<bool, BatchLoadError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(BatchLoadError::InvalidPension {
            value: value.to_string(),
            row,
        }),
    }
}

/// Convert a single CSV row into a request. `row` is 1-based.
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<ConversionRequest, BatchLoadError> {
    let amount = parse_amount(&row.amount).map_err(|source| BatchLoadError::InvalidAmount {
        row: row_number,
        source,
    })?;
    let direction =
        Direction::parse(&row.direction).ok_or_else(|| BatchLoadError::InvalidDirection {
            value: row.direction.clone(),
            row: row_number,
        })?;
    let supplementary_pension = parse_pension(row.supplementary_pension.as_deref(), row_number)?;
    let relief_category = row
        .relief_category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    Ok(ConversionRequest {
        amount,
        direction,
        relief_category,
        supplementary_pension,
    })
}

/// Parse batch requests from any reader. Rows are returned in file order.
///
/// # Errors
///
/// * [`BatchLoadError::Parse`] if the CSV is structurally invalid or a
///   required column is missing.
/// * [`BatchLoadError::InvalidAmount`], [`BatchLoadError::InvalidDirection`]
///   or [`BatchLoadError::InvalidPension`] for the first bad cell.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<ConversionRequest>, BatchLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

pub fn load_from_str(input: &str) -> Result<Vec<ConversionRequest>, BatchLoadError> {
    load_from_reader(input.as_bytes())
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<ConversionRequest>, BatchLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BatchLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const MINIMAL_CSV: &str = "\
amount,direction
1500.00,gross
";

    const FULL_CSV: &str = "\
amount,direction,relief_category,supplementary_pension
1500.00,gross,,
960.62,net,standard,false
\"2,000\",gross_to_net, none ,yes
";

    // =========================================================================
    // well-formed input
    // =========================================================================

    #[test]
    fn minimal_csv_uses_defaults() {
        let requests = load_from_str(MINIMAL_CSV).unwrap();

        assert_eq!(requests, vec![ConversionRequest::gross_to_net(dec!(1500.00))]);
    }

    #[test]
    fn full_csv_keeps_file_order_and_options() {
        let requests = load_from_str(FULL_CSV).unwrap();

        assert_eq!(
            requests,
            vec![
                ConversionRequest::gross_to_net(dec!(1500.00)),
                ConversionRequest::net_to_gross(dec!(960.62)).with_relief_category("standard"),
                ConversionRequest::gross_to_net(dec!(2000))
                    .with_relief_category("none")
                    .with_supplementary_pension(true),
            ]
        );
    }

    #[test]
    fn header_only_csv_is_empty() {
        assert!(load_from_str("amount,direction\n").unwrap().is_empty());
    }

    #[test]
    fn pension_flag_accepts_common_spellings() {
        for (value, expected) in [("TRUE", true), ("1", true), ("y", true), ("No", false), ("0", false)] {
            assert_eq!(parse_pension(Some(value), 1).unwrap(), expected, "value {value}");
        }
        assert!(!parse_pension(None, 1).unwrap());
    }

    // =========================================================================
    // malformed input
    // =========================================================================

    #[test]
    fn missing_required_column_is_a_parse_error() {
        let result = load_from_str("amount\n1500\n");

        assert!(matches!(result, Err(BatchLoadError::Parse(_))));
    }

    #[test]
    fn bad_amount_reports_row_number() {
        let csv = "amount,direction\n1500,gross\nabc,net\n";

        match load_from_str(csv) {
            Err(BatchLoadError::InvalidAmount { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn bad_direction_reports_value_and_row() {
        let csv = "amount,direction\n1500,sideways\n";

        match load_from_str(csv) {
            Err(BatchLoadError::InvalidDirection { value, row }) => {
                assert_eq!(value, "sideways");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidDirection, got {other:?}"),
        }
    }

    #[test]
    fn bad_pension_flag_is_rejected() {
        let csv = "amount,direction,supplementary_pension\n1500,gross,maybe\n";

        let error = load_from_str(csv).unwrap_err();

        assert!(error.to_string().contains("maybe"));
        assert!(matches!(error, BatchLoadError::InvalidPension { row: 1, .. }));
    }

    #[test]
    fn uneven_row_is_rejected() {
        let csv = "amount,direction\n1500,gross,extra\n";

        assert!(matches!(load_from_str(csv), Err(BatchLoadError::Parse(_))));
    }
}
