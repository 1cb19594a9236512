use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source CSV
// ---------------------------------------------------------------------------

/// A single sales record (one row of the source dataset).
///
/// The five required columns are typed; any additional CSV columns are kept
/// verbatim in `extra` so an export reproduces the input column-for-column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub category: String,
    pub region: String,
    pub sales: f64,
    /// May be negative (a loss).
    pub profit: f64,
    /// Pass-through columns: column_name → raw text value.
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
///
/// Records keep their file order; `categories`, `regions` and the date
/// bounds are derived once at load time and drive the filter widgets.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All records (rows) in file order.
    pub records: Vec<SalesRecord>,
    /// Sorted set of distinct category values.
    pub categories: BTreeSet<String>,
    /// Sorted set of distinct region values.
    pub regions: BTreeSet<String>,
    /// Ordered list of extra (pass-through) column names.
    pub extra_columns: Vec<String>,
    /// Earliest and latest record date, None for an empty dataset.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<SalesRecord>, extra_columns: Vec<String>) -> Self {
        let mut categories = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            categories.insert(rec.category.clone());
            regions.insert(rec.region.clone());
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        SalesDataset {
            records,
            categories,
            regions,
            extra_columns,
            date_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
