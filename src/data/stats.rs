use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::SalesRecord;

// ---------------------------------------------------------------------------
// Summary – headline metrics for the current view
// ---------------------------------------------------------------------------

/// Descriptive statistics over one filtered view.
///
/// Aggregates that are undefined on the given data are `None` and must be
/// rendered as an explicit "no data" marker, never as 0, NaN or infinity:
/// means on an empty view, std-dev below two records, profit rate when
/// total sales is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub total_sales: f64,
    pub mean_sales: Option<f64>,
    /// Sample standard deviation (ddof = 1).
    pub sales_std_dev: Option<f64>,
    pub total_profit: f64,
    pub mean_profit: Option<f64>,
    /// Total profit / total sales × 100.
    pub profit_rate: Option<f64>,
}

/// Compute the headline metrics. Totals of an empty view are 0 by the usual
/// empty-sum convention; the `Option` fields carry the undefined cases.
pub fn summarize(records: &[SalesRecord]) -> Summary {
    let count = records.len();
    let total_sales: f64 = records.iter().map(|r| r.sales).sum();
    let total_profit: f64 = records.iter().map(|r| r.profit).sum();

    let mean_sales = (count > 0).then(|| total_sales / count as f64);
    let mean_profit = (count > 0).then(|| total_profit / count as f64);
    let sales_std_dev = std_dev(records.iter().map(|r| r.sales), mean_sales, count);

    let profit_rate = (total_sales != 0.0).then(|| total_profit / total_sales * 100.0);

    Summary {
        count,
        total_sales,
        mean_sales,
        sales_std_dev,
        total_profit,
        mean_profit,
        profit_rate,
    }
}

fn std_dev(values: impl Iterator<Item = f64>, mean: Option<f64>, count: usize) -> Option<f64> {
    if count < 2 {
        return None;
    }
    let mean = mean?;
    let sum_sq: f64 = values.map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (count - 1) as f64).sqrt())
}

// ---------------------------------------------------------------------------
// Grouped sums – per-category and per-region breakdowns
// ---------------------------------------------------------------------------

/// Per-group totals for the category / region breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupTotals {
    pub count: usize,
    pub sales_sum: f64,
    pub sales_mean: f64,
    pub profit_sum: f64,
    pub profit_mean: f64,
}

/// Which record field to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Category,
    Region,
}

/// Group records by category or region, summing sales and profit per group.
/// Every value present in the input keeps its group, even when its sums are
/// zero; the `BTreeMap` gives a stable display order.
pub fn group_sums(records: &[SalesRecord], key: GroupKey) -> BTreeMap<String, GroupTotals> {
    let mut groups: BTreeMap<String, GroupTotals> = BTreeMap::new();

    for rec in records {
        let name = match key {
            GroupKey::Category => &rec.category,
            GroupKey::Region => &rec.region,
        };
        let entry = groups.entry(name.clone()).or_default();
        entry.count += 1;
        entry.sales_sum += rec.sales;
        entry.profit_sum += rec.profit;
    }

    for totals in groups.values_mut() {
        totals.sales_mean = totals.sales_sum / totals.count as f64;
        totals.profit_mean = totals.profit_sum / totals.count as f64;
    }

    groups
}

// ---------------------------------------------------------------------------
// Rolling average – trailing-window mean of sales over time
// ---------------------------------------------------------------------------

/// Trailing rolling average of `sales` with the given window.
///
/// Records are sorted by date ascending first. Position `i` holds the mean
/// of the `window` sales values ending at `i`; positions before a full
/// window has been seen are `None` rather than a truncated-window average,
/// so the output aligns index-for-index with the sorted sales series.
pub fn rolling_average(
    records: &[SalesRecord],
    window: usize,
) -> Vec<(NaiveDate, Option<f64>)> {
    assert!(window > 0, "rolling window must be positive");

    let mut sorted: Vec<(NaiveDate, f64)> =
        records.iter().map(|r| (r.date, r.sales)).collect();
    sorted.sort_by_key(|(date, _)| *date);

    let mut out = Vec::with_capacity(sorted.len());
    let mut running = 0.0;

    for (i, &(date, sales)) in sorted.iter().enumerate() {
        running += sales;
        if i >= window {
            running -= sorted[i - window].1;
        }
        let avg = (i + 1 >= window).then(|| running / window as f64);
        out.push((date, avg));
    }

    out
}

// ---------------------------------------------------------------------------
// Correlation – Pearson r between sales and profit
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient between `sales` and `profit`.
/// `None` below two records or when either series has zero variance.
pub fn sales_profit_correlation(records: &[SalesRecord]) -> Option<f64> {
    let n = records.len();
    if n < 2 {
        return None;
    }

    let mean_sales: f64 = records.iter().map(|r| r.sales).sum::<f64>() / n as f64;
    let mean_profit: f64 = records.iter().map(|r| r.profit).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_sales = 0.0;
    let mut var_profit = 0.0;
    for rec in records {
        let ds = rec.sales - mean_sales;
        let dp = rec.profit - mean_profit;
        cov += ds * dp;
        var_sales += ds * ds;
        var_profit += dp * dp;
    }

    if var_sales == 0.0 || var_profit == 0.0 {
        return None;
    }
    Some(cov / (var_sales.sqrt() * var_profit.sqrt()))
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

    fn day(n: u32) -> String {
        format!("2024-01-{n:02}")
    }

    #[test]
    fn summary_of_known_records() {
        let records = [
            rec("2024-01-01", "A", "East", 100.0, 10.0),
            rec("2024-01-02", "A", "East", 200.0, 20.0),
        ];
        let s = summarize(&records);
        assert_eq!(s.count, 2);
        assert_eq!(s.total_sales, 300.0);
        assert_eq!(s.mean_sales, Some(150.0));
        assert_eq!(s.total_profit, 30.0);
        assert_eq!(s.profit_rate, Some(10.0));
        // Sample std-dev of [100, 200] is |200-100| / sqrt(2) * ... = 70.71...
        let sd = s.sales_std_dev.unwrap();
        assert!((sd - 70.710_678).abs() < 1e-6, "{sd}");
    }

    #[test]
    fn empty_view_has_undefined_means() {
        let s = summarize(&[]);
        assert_eq!(s.total_sales, 0.0);
        assert_eq!(s.mean_sales, None);
        assert_eq!(s.sales_std_dev, None);
        assert_eq!(s.profit_rate, None);
    }

    #[test]
    fn single_record_has_no_std_dev() {
        let s = summarize(&[rec("2024-01-01", "A", "East", 100.0, 10.0)]);
        assert_eq!(s.mean_sales, Some(100.0));
        assert_eq!(s.sales_std_dev, None);
    }

    #[test]
    fn profit_rate_guarded_against_zero_sales() {
        let s = summarize(&[rec("2024-01-01", "A", "East", 0.0, 5.0)]);
        assert_eq!(s.total_profit, 5.0);
        assert_eq!(s.profit_rate, None);
    }

    #[test]
    fn group_sums_keep_every_distinct_value() {
        let records = [
            rec("2024-01-01", "A", "East", 100.0, 10.0),
            rec("2024-01-02", "B", "West", 50.0, -5.0),
            rec("2024-01-03", "A", "West", 30.0, -30.0),
            // Zero-sum group must still appear.
            rec("2024-01-04", "C", "East", 0.0, 0.0),
        ];
        let by_cat = group_sums(&records, GroupKey::Category);
        assert_eq!(by_cat.len(), 3);
        assert_eq!(by_cat["A"].sales_sum, 130.0);
        assert_eq!(by_cat["A"].profit_sum, -20.0);
        assert_eq!(by_cat["C"].sales_sum, 0.0);

        let by_region = group_sums(&records, GroupKey::Region);
        assert_eq!(by_region["East"].count, 2);
        assert_eq!(by_region["East"].sales_mean, 50.0);
        assert_eq!(by_region["West"].profit_mean, -17.5);
    }

    #[test]
    fn rolling_average_undefined_until_window_filled() {
        let records: Vec<SalesRecord> = (1..=5)
            .map(|i| rec(&day(i), "A", "East", (i as f64) * 10.0, 0.0))
            .collect();

        let out = rolling_average(&records, 3);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].1, None);
        assert_eq!(out[1].1, None);
        assert_eq!(out[2].1, Some(20.0)); // (10+20+30)/3
        assert_eq!(out[3].1, Some(30.0)); // (20+30+40)/3
        assert_eq!(out[4].1, Some(40.0)); // (30+40+50)/3
    }

    #[test]
    fn rolling_average_shorter_than_window_is_all_undefined() {
        let records = [
            rec("2024-01-01", "A", "East", 10.0, 0.0),
            rec("2024-01-02", "A", "East", 20.0, 0.0),
        ];
        let out = rolling_average(&records, 7);
        assert!(out.iter().all(|(_, avg)| avg.is_none()));
    }

    #[test]
    fn rolling_average_sorts_by_date_first() {
        let records = [
            rec("2024-01-03", "A", "East", 30.0, 0.0),
            rec("2024-01-01", "A", "East", 10.0, 0.0),
            rec("2024-01-02", "A", "East", 20.0, 0.0),
        ];
        let out = rolling_average(&records, 3);
        assert_eq!(out[0].0, "2024-01-01".parse().unwrap());
        assert_eq!(out[2].1, Some(20.0));
    }

    #[test]
    fn correlation_of_linear_series_is_one() {
        // profit = sales / 10, perfectly correlated
        let records: Vec<SalesRecord> = (1..=4)
            .map(|i| rec(&day(i), "A", "East", (i as f64) * 100.0, (i as f64) * 10.0))
            .collect();
        let r = sales_profit_correlation(&records).unwrap();
        assert!((r - 1.0).abs() < 1e-12, "{r}");
    }

    #[test]
    fn correlation_undefined_on_constant_series() {
        let records = [
            rec("2024-01-01", "A", "East", 100.0, 10.0),
            rec("2024-01-02", "A", "East", 100.0, 20.0),
        ];
        assert_eq!(sales_profit_correlation(&records), None);
        assert_eq!(
            sales_profit_correlation(&records[..1]),
            None,
            "single element has no variance"
        );
    }
}
