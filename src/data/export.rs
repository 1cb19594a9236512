use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// CSV export of the filtered view
// ---------------------------------------------------------------------------

/// Serialize the view's records back to CSV: header row first, one row per
/// record, extra columns after the five required ones in their load order.
/// The output round-trips through the loader into an equivalent dataset.
pub fn to_csv(view: &FilteredView, extra_columns: &[String]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = vec!["date", "category", "region", "sales", "profit"];
    header.extend(extra_columns.iter().map(String::as_str));
    writer.write_record(&header).context("writing CSV header")?;

    for rec in &view.records {
        let mut row: Vec<String> = vec![
            rec.date.format("%Y-%m-%d").to_string(),
            rec.category.clone(),
            rec.region.clone(),
            format_number(rec.sales),
            format_number(rec.profit),
        ];
        for col in extra_columns {
            row.push(rec.extra.get(col).cloned().unwrap_or_default());
        }
        writer.write_record(&row).context("writing CSV row")?;
    }

    writer.flush().context("flushing CSV writer")?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("recovering CSV buffer: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

/// Write the export to disk.
pub fn write_csv(view: &FilteredView, extra_columns: &[String], path: &Path) -> Result<()> {
    let csv = to_csv(view, extra_columns)?;
    std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} records to {}", view.len(), path.display());
    Ok(())
}

/// Download-style filename carrying an export timestamp,
/// e.g. `filtered_data_20240131_142501.csv`.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("filtered_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Integral values print without a fractional part so numbers survive a
/// round-trip unchanged; everything else keeps full precision.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::loader::load_csv_reader;

    const SAMPLE: &str = "\
date,category,region,sales,profit,store_id
2024-01-01,Electronics,East,100,10.5,S-1
2024-01-02,Food,West,250,-12,S-2
";

    #[test]
    fn export_round_trips_through_the_loader() {
        let ds = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let view = apply(&ds, &FilterCriteria::select_all(&ds));

        let csv = to_csv(&view, &ds.extra_columns).unwrap();
        let reloaded = load_csv_reader(csv.as_bytes()).unwrap();

        assert_eq!(reloaded.records, ds.records);
        assert_eq!(reloaded.extra_columns, ds.extra_columns);
    }

    #[test]
    fn header_precedes_rows() {
        let ds = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        let view = apply(&ds, &FilterCriteria::select_all(&ds));
        let csv = to_csv(&view, &ds.extra_columns).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,category,region,sales,profit,store_id"
        );
        assert_eq!(lines.next().unwrap(), "2024-01-01,Electronics,East,100,10.5,S-1");
    }

    #[test]
    fn empty_view_exports_header_only() {
        let ds = load_csv_reader("date,category,region,sales,profit\n".as_bytes()).unwrap();
        let view = apply(&ds, &FilterCriteria::select_all(&ds));
        let csv = to_csv(&view, &ds.extra_columns).unwrap();
        assert_eq!(csv.trim_end(), "date,category,region,sales,profit");
    }

    #[test]
    fn filename_embeds_timestamp() {
        let now = "2024-01-31T14:25:01".parse().unwrap();
        assert_eq!(export_filename(now), "filtered_data_20240131_142501.csv");
    }
}
