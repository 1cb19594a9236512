use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{SalesDataset, SalesRecord};
use super::stats::{self, Summary};

// ---------------------------------------------------------------------------
// FilterCriteria – the user's current constraints
// ---------------------------------------------------------------------------

/// Everything the user has selected, captured as a plain value and passed
/// into [`apply`] on every run. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive date range. `None` is the explicit "range is incomplete,
    /// pass all dates" branch: filtering then runs on category/region only.
    pub date_range: Option<DateRange>,
    /// Selected categories. An empty set matches nothing.
    pub categories: BTreeSet<String>,
    /// Selected regions. An empty set matches nothing.
    pub regions: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that keep the whole dataset: full date span, every
    /// category and region selected.
    pub fn select_all(dataset: &SalesDataset) -> Self {
        FilterCriteria {
            date_range: dataset.date_bounds.map(|(start, end)| DateRange { start, end }),
            categories: dataset.categories.clone(),
            regions: dataset.regions.clone(),
        }
    }

    fn matches(&self, rec: &SalesRecord) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(rec.date) {
                return false;
            }
        }
        self.categories.contains(&rec.category) && self.regions.contains(&rec.region)
    }
}

/// Inclusive `[start, end]` date range with `start <= end` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Rejects an inverted pair instead of silently swapping it; the caller
    /// decides whether to fall back to "no date filter".
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// FilteredView – one pipeline run's output
// ---------------------------------------------------------------------------

/// The records passing the current criteria plus their aggregates.
/// Rebuilt from scratch on every criteria change, never patched.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub records: Vec<SalesRecord>,
    pub summary: Summary,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Apply the criteria to the dataset. All four conditions are conjunctive:
/// date within range (when a range is set), category selected, region
/// selected. Pure: identical inputs always yield the identical view.
pub fn apply(dataset: &SalesDataset, criteria: &FilterCriteria) -> FilteredView {
    let records: Vec<SalesRecord> = dataset
        .records
        .iter()
        .filter(|rec| criteria.matches(rec))
        .cloned()
        .collect();

    let summary = stats::summarize(&records);

    FilteredView { records, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn rec(date: &str, category: &str, region: &str, sales: f64, profit: f64) -> SalesRecord {
        SalesRecord {
            date: date.parse().unwrap(),
            category: category.to_string(),
            region: region.to_string(),
            sales,
            profit,
            extra: BTreeMap::new(),
        }
    }

    fn dataset() -> SalesDataset {
        SalesDataset::from_records(
            vec![
                rec("2024-01-01", "A", "East", 100.0, 10.0),
                rec("2024-01-02", "A", "East", 200.0, 20.0),
                rec("2024-01-03", "B", "West", 50.0, -5.0),
            ],
            Vec::new(),
        )
    }

    fn criteria(range: Option<(&str, &str)>, cats: &[&str], regs: &[&str]) -> FilterCriteria {
        FilterCriteria {
            date_range: range.map(|(s, e)| {
                DateRange::new(s.parse().unwrap(), e.parse().unwrap()).unwrap()
            }),
            categories: cats.iter().map(|s| s.to_string()).collect(),
            regions: regs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn conjunctive_predicate() {
        let view = apply(
            &dataset(),
            &criteria(Some(("2024-01-01", "2024-01-02")), &["A"], &["East"]),
        );
        assert_eq!(view.len(), 2);
        for rec in &view.records {
            assert_eq!(rec.category, "A");
            assert_eq!(rec.region, "East");
        }
        assert_eq!(view.summary.total_sales, 300.0);
        assert_eq!(view.summary.total_profit, 30.0);
        assert_eq!(view.summary.profit_rate, Some(10.0));
    }

    #[test]
    fn repeated_application_is_identical() {
        let ds = dataset();
        let c = criteria(Some(("2024-01-01", "2024-01-03")), &["A", "B"], &["East", "West"]);
        let a = apply(&ds, &c);
        let b = apply(&ds, &c);
        assert_eq!(a.records, b.records);
        assert_eq!(a.summary.total_sales, b.summary.total_sales);
    }

    #[test]
    fn empty_category_set_matches_nothing() {
        let view = apply(
            &dataset(),
            &criteria(Some(("2024-01-01", "2024-01-03")), &[], &["East", "West"]),
        );
        assert!(view.is_empty());
        assert!(view.summary.mean_sales.is_none());
    }

    #[test]
    fn missing_range_falls_back_to_category_region_only() {
        // Incomplete date input from the UI arrives as None, not a crash.
        let view = apply(&dataset(), &criteria(None, &["A", "B"], &["East", "West"]));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn select_all_keeps_everything() {
        let ds = dataset();
        let view = apply(&ds, &FilterCriteria::select_all(&ds));
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let start: NaiveDate = "2024-02-01".parse().unwrap();
        let end: NaiveDate = "2024-01-01".parse().unwrap();
        assert!(DateRange::new(start, end).is_none());
        assert!(DateRange::new(end, start).is_some());
    }

    #[test]
    fn apply_includes_records_on_the_range_endpoints() {
        let view = apply(
            &dataset(),
            &criteria(Some(("2024-01-01", "2024-01-03")), &["A", "B"], &["East", "West"]),
        );
        assert_eq!(view.len(), 3);
        let narrowed = apply(
            &dataset(),
            &criteria(Some(("2024-01-02", "2024-01-02")), &["A", "B"], &["East", "West"]),
        );
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed.records[0].date, "2024-01-02".parse().unwrap());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange::new("2024-01-01".parse().unwrap(), "2024-01-03".parse().unwrap())
            .unwrap();
        assert!(range.contains("2024-01-01".parse().unwrap()));
        assert!(range.contains("2024-01-03".parse().unwrap()));
        assert!(!range.contains("2024-01-04".parse().unwrap()));
    }
}
