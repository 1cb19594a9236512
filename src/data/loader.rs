use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use super::model::{SalesDataset, SalesRecord};

/// Default dataset used when the user has not supplied a file.
pub const DEFAULT_SOURCE: &str = "sample_data.csv";

/// Columns every source file must provide.
const REQUIRED_COLUMNS: [&str; 5] = ["date", "category", "region", "sales", "profit"];

/// Date formats accepted for the `date` column, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed load. Both variants are fatal for the whole pipeline run; the
/// caller must not hand a partially parsed dataset to the filter engine.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No file was supplied and the bundled fallback is absent.
    #[error("no data source: {0} not found and no file was supplied")]
    SourceMissing(PathBuf),

    /// The source exists but could not be read.
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A header or row failed to parse. `row` is 1-based and counts data
    /// rows, not the header.
    #[error("row {row}: {message}")]
    Parse { row: usize, message: String },
}

impl LoadError {
    fn parse(row: usize, message: impl Into<String>) -> Self {
        LoadError::Parse {
            row,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales dataset from a CSV file.
pub fn load_csv(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_reader(file)
}

/// Load the bundled sample dataset, the fallback when no file is supplied.
/// Probed in the working directory first, then beside the executable.
/// Returns [`LoadError::SourceMissing`] when neither location has it.
pub fn load_default() -> Result<SalesDataset, LoadError> {
    let path = resolve_existing(&default_source_candidates())
        .ok_or_else(|| LoadError::SourceMissing(PathBuf::from(DEFAULT_SOURCE)))?;
    load_csv(&path)
}

fn default_source_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(DEFAULT_SOURCE)];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(DEFAULT_SOURCE));
        }
    }
    candidates
}

fn resolve_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

/// Parse CSV from any reader. Split out from [`load_csv`] so the export
/// round-trip and tests need no filesystem.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<SalesDataset, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| LoadError::parse(0, format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut required_idx = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, col) in required_idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == col)
            .ok_or_else(|| LoadError::parse(0, format!("missing required column '{col}'")))?;
    }
    let [date_idx, category_idx, region_idx, sales_idx, profit_idx] = required_idx;

    // Everything outside the required five passes through untouched.
    let extra_columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !required_idx.contains(i))
        .map(|(_, h)| h.clone())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in csv_reader.records().enumerate() {
        let row = row_no + 1;
        let record = result.map_err(|e| LoadError::parse(row, format!("malformed row: {e}")))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let date = parse_date(field(date_idx))
            .ok_or_else(|| LoadError::parse(row, format!("unparseable date '{}'", field(date_idx))))?;
        let sales = parse_number(field(sales_idx))
            .ok_or_else(|| LoadError::parse(row, format!("'{}' is not a number", field(sales_idx))))?;
        let profit = parse_number(field(profit_idx))
            .ok_or_else(|| LoadError::parse(row, format!("'{}' is not a number", field(profit_idx))))?;

        let mut extra = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if required_idx.contains(&col_idx) {
                continue;
            }
            if let Some(name) = headers.get(col_idx) {
                extra.insert(name.clone(), value.to_string());
            }
        }

        records.push(SalesRecord {
            date,
            category: field(category_idx).to_string(),
            region: field(region_idx).to_string(),
            sales,
            profit,
            extra,
        });
    }

    // Zero rows with a valid header is a valid (empty) dataset.
    Ok(SalesDataset::from_records(records, extra_columns))
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Numbers may carry thousands separators from spreadsheet exports.
fn parse_number(s: &str) -> Option<f64> {
    let cleaned = s.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,category,region,sales,profit
2024-01-01,Electronics,East,100,10
2024-01-02,Electronics,East,200,20
2024-01-03,Food,West,50,-5
";

    #[test]
    fn loads_well_formed_csv() {
        let ds = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0].date, "2024-01-01".parse().unwrap());
        assert_eq!(ds.records[2].profit, -5.0);
        assert_eq!(
            ds.categories.iter().collect::<Vec<_>>(),
            ["Electronics", "Food"]
        );
        assert!(ds.extra_columns.is_empty());
    }

    #[test]
    fn empty_file_with_header_is_valid() {
        let ds = load_csv_reader("date,category,region,sales,profit\n".as_bytes()).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_column_is_a_header_error() {
        let err = load_csv_reader("date,category,sales,profit\n".as_bytes()).unwrap_err();
        match err {
            LoadError::Parse { row, message } => {
                assert_eq!(row, 0);
                assert!(message.contains("region"), "{message}");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_fails_the_whole_load() {
        let input = "\
date,category,region,sales,profit
2024-01-01,A,East,100,10
not-a-date,A,East,200,20
";
        let err = load_csv_reader(input.as_bytes()).unwrap_err();
        match err {
            LoadError::Parse { row, message } => {
                assert_eq!(row, 2);
                assert!(message.contains("not-a-date"), "{message}");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn slash_dates_and_separators_are_accepted() {
        let input = "\
date,category,region,sales,profit
2024/01/05,A,East,\"1,250\",125
";
        let ds = load_csv_reader(input.as_bytes()).unwrap();
        assert_eq!(ds.records[0].date, "2024-01-05".parse().unwrap());
        assert_eq!(ds.records[0].sales, 1250.0);
    }

    #[test]
    fn fallback_resolution_takes_the_first_existing_candidate() {
        let missing = [
            PathBuf::from("no/such/dir/sample_data.csv"),
            PathBuf::from("also/missing/sample_data.csv"),
        ];
        assert_eq!(resolve_existing(&missing), None);

        let present = std::env::temp_dir().join("salesdash_fallback_test.csv");
        std::fs::write(&present, "date,category,region,sales,profit\n").unwrap();
        let candidates = [missing[0].clone(), present.clone()];
        assert_eq!(resolve_existing(&candidates), Some(present.clone()));
        std::fs::remove_file(present).unwrap();
    }

    #[test]
    fn extra_columns_pass_through() {
        let input = "\
date,category,region,sales,profit,store_id,note
2024-01-01,A,East,100,10,S-42,promo
";
        let ds = load_csv_reader(input.as_bytes()).unwrap();
        assert_eq!(ds.extra_columns, ["store_id", "note"]);
        assert_eq!(ds.records[0].extra["store_id"], "S-42");
        assert_eq!(ds.records[0].extra["note"], "promo");
    }
}
