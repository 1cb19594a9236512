use chrono::NaiveDate;
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::data::stats::{self, GroupKey};
use crate::state::AppState;

/// egui_plot axes are plain f64, so dates are plotted as days since the
/// Unix epoch (`NaiveDate::default()`).
fn date_to_x(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

fn x_to_date_label(x: f64) -> String {
    NaiveDate::default()
        .checked_add_days(chrono::Days::new(x.max(0.0) as u64))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Time-series tab – sales over time with optional rolling average
// ---------------------------------------------------------------------------

/// Render the sales time-series with the optional rolling-average overlay.
pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else { return };

    let mut by_date: Vec<(NaiveDate, f64)> =
        view.records.iter().map(|r| (r.date, r.sales)).collect();
    by_date.sort_by_key(|(date, _)| *date);

    let sales_points: PlotPoints = by_date
        .iter()
        .map(|&(date, sales)| [date_to_x(date), sales])
        .collect();

    // Warm-up positions are None and simply not drawn, so the overlay stays
    // aligned with the sales series.
    let rolling_points: Option<PlotPoints> = state.show_rolling_average.then(|| {
        stats::rolling_average(&view.records, state.rolling_window)
            .into_iter()
            .filter_map(|(date, avg)| avg.map(|a| [date_to_x(date), a]))
            .collect()
    });

    Plot::new("time_series_plot")
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("Sales")
        .x_axis_formatter(|mark, _range| x_to_date_label(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(sales_points)
                    .name("Sales")
                    .color(Color32::LIGHT_BLUE)
                    .width(1.0),
            );
            if let Some(points) = rolling_points {
                plot_ui.line(
                    Line::new(points)
                        .name(format!("{}-day rolling average", state.rolling_window))
                        .color(Color32::RED)
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Category tab – per-category sales and profit bars
// ---------------------------------------------------------------------------

/// Render per-category sales and profit as grouped bar charts.
pub fn category_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else { return };

    let groups = stats::group_sums(&view.records, GroupKey::Category);

    let sales_bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (name, totals))| {
            Bar::new(i as f64, totals.sales_sum)
                .name(name)
                .fill(state.category_colors.color_for(name))
                .width(0.4)
        })
        .collect();

    let profit_bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(i, (name, totals))| {
            Bar::new(i as f64 + 0.45, totals.profit_sum)
                .name(name)
                .fill(Color32::GRAY)
                .width(0.4)
        })
        .collect();

    let labels: Vec<String> = groups.keys().cloned().collect();

    Plot::new("category_plot")
        .legend(Legend::default())
        .y_axis_label("Amount")
        .x_axis_formatter(move |mark, _range| {
            labels
                .get(mark.value.round() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(sales_bars).name("Sales"));
            plot_ui.bar_chart(BarChart::new(profit_bars).name("Profit"));
        });
}

// ---------------------------------------------------------------------------
// Region tab – sales vs profit scatter coloured by region
// ---------------------------------------------------------------------------

/// Render the sales-vs-profit scatter, one colour per region.
pub fn region_scatter(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else { return };
    let Some(dataset) = &state.dataset else { return };

    Plot::new("region_scatter")
        .legend(Legend::default())
        .x_axis_label("Sales")
        .y_axis_label("Profit")
        .show(ui, |plot_ui| {
            for region in &dataset.regions {
                let points: PlotPoints = view
                    .records
                    .iter()
                    .filter(|r| &r.region == region)
                    .map(|r| [r.sales, r.profit])
                    .collect();

                plot_ui.points(
                    Points::new(points)
                        .name(region)
                        .color(state.region_colors.color_for(region))
                        .radius(3.0),
                );
            }
        });
}
