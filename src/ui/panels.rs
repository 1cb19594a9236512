use std::collections::BTreeSet;

use chrono::Local;
use eframe::egui::{self, Color32, Grid, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::stats::{self, GroupKey, Summary};
use crate::data::{export, loader};
use crate::state::{AppState, MAX_ROLLING_WINDOW, MIN_ROLLING_WINDOW};

/// Marker shown wherever an aggregate is undefined on the current view.
const UNDEFINED: &str = "–";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: date range, categories, regions.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let categories = dataset.categories.clone();
    let regions = dataset.regions.clone();
    let mut dates_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            if let (Some(mut start), Some(mut end)) = (state.start_input, state.end_input) {
                ui.horizontal(|ui: &mut Ui| {
                    if ui
                        .add(DatePickerButton::new(&mut start).id_salt("start_date"))
                        .changed()
                    {
                        state.start_input = Some(start);
                        dates_changed = true;
                    }
                    ui.label("→");
                    if ui
                        .add(DatePickerButton::new(&mut end).id_salt("end_date"))
                        .changed()
                    {
                        state.end_input = Some(end);
                        dates_changed = true;
                    }
                });
                if state.criteria.date_range.is_none() {
                    ui.label(
                        RichText::new("Invalid range: dates not filtered")
                            .color(Color32::YELLOW)
                            .small(),
                    );
                }
            } else {
                ui.label("No dates in dataset.");
            }
            ui.separator();

            value_filter(ui, "Categories", &categories, state, FilterColumn::Categories);
            ui.separator();
            value_filter(ui, "Regions", &regions, state, FilterColumn::Regions);
        });

    if dates_changed {
        state.refilter();
    }
}

/// Which filter column a checkbox list drives.
#[derive(Clone, Copy)]
enum FilterColumn {
    Categories,
    Regions,
}

/// Checkbox list with All/None shortcuts for one filter column. All
/// mutations go through the [`AppState`] helpers, which refilter themselves.
fn value_filter(
    ui: &mut Ui,
    title: &str,
    all_values: &BTreeSet<String>,
    state: &mut AppState,
    column: FilterColumn,
) {
    let selected = match column {
        FilterColumn::Categories => &state.criteria.categories,
        FilterColumn::Regions => &state.criteria.regions,
    };
    let header = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    match column {
                        FilterColumn::Categories => state.select_all_categories(),
                        FilterColumn::Regions => state.select_all_regions(),
                    }
                }
                if ui.small_button("None").clicked() {
                    match column {
                        FilterColumn::Categories => state.select_no_categories(),
                        FilterColumn::Regions => state.select_no_regions(),
                    }
                }
            });

            for value in all_values {
                let mut checked = match column {
                    FilterColumn::Categories => state.criteria.categories.contains(value),
                    FilterColumn::Regions => state.criteria.regions.contains(value),
                };
                if ui.checkbox(&mut checked, value).changed() {
                    match column {
                        FilterColumn::Categories => state.toggle_category(value),
                        FilterColumn::Regions => state.toggle_region(value),
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_view = state.view.is_some();
            if ui
                .add_enabled(has_view, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!("{} records loaded, {} match", ds.len(), view.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric row – headline aggregates
// ---------------------------------------------------------------------------

/// Render the four headline metrics above the tabs.
pub fn metric_row(ui: &mut Ui, summary: &Summary) {
    ui.columns(4, |cols| {
        metric(
            &mut cols[0],
            "Total sales",
            format!("¥{:.0}", summary.total_sales),
            format!("{} records", summary.count),
        );
        metric(
            &mut cols[1],
            "Mean sales",
            fmt_opt(summary.mean_sales, "¥"),
            format!("{} std dev", fmt_opt(summary.sales_std_dev, "")),
        );
        metric(
            &mut cols[2],
            "Total profit",
            format!("¥{:.0}", summary.total_profit),
            format!("{} mean", fmt_opt(summary.mean_profit, "¥")),
        );
        metric(
            &mut cols[3],
            "Profit rate",
            match summary.profit_rate {
                Some(rate) => format!("{rate:.1}%"),
                None => format!("{UNDEFINED} (no sales)"),
            },
            String::new(),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String, sub: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading());
        if !sub.is_empty() {
            ui.label(RichText::new(sub).small().weak());
        }
    });
}

fn fmt_opt(value: Option<f64>, prefix: &str) -> String {
    match value {
        Some(v) => format!("{prefix}{v:.0}"),
        None => UNDEFINED.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Time-series controls
// ---------------------------------------------------------------------------

/// Rolling-average checkbox and window slider for the time-series tab.
pub fn rolling_controls(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut state.show_rolling_average, "Show rolling average");
        if state.show_rolling_average {
            let mut window = state.rolling_window;
            ui.add(
                egui::Slider::new(&mut window, MIN_ROLLING_WINDOW..=MAX_ROLLING_WINDOW)
                    .text("window (days)"),
            );
            state.set_rolling_window(window);
        }
    });
}

// ---------------------------------------------------------------------------
// Region table – per-region sums and means
// ---------------------------------------------------------------------------

/// Grid of per-region sales/profit sums and means.
pub fn region_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else { return };
    let groups = stats::group_sums(&view.records, GroupKey::Region);

    Grid::new("region_table")
        .striped(true)
        .min_col_width(90.0)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Region");
            ui.strong("Sales (sum)");
            ui.strong("Sales (mean)");
            ui.strong("Profit (sum)");
            ui.strong("Profit (mean)");
            ui.end_row();

            for (region, totals) in &groups {
                ui.colored_label(state.region_colors.color_for(region), region);
                ui.label(format!("{:.2}", totals.sales_sum));
                ui.label(format!("{:.2}", totals.sales_mean));
                ui.label(format!("{:.2}", totals.profit_sum));
                ui.label(format!("{:.2}", totals.profit_mean));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Details tab – correlation readout and filtered records
// ---------------------------------------------------------------------------

/// Correlation readout plus the raw filtered record table.
pub fn details_panel(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else { return };

    ui.strong("Sales / profit correlation");
    match stats::sales_profit_correlation(&view.records) {
        Some(r) => ui.label(format!("Pearson r = {r:.3}")),
        None => ui.label(format!("{UNDEFINED} (insufficient data or zero variance)")),
    };
    ui.separator();

    ui.strong("Filtered records");
    if view.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    let extra_columns = state
        .dataset
        .as_ref()
        .map(|ds| ds.extra_columns.clone())
        .unwrap_or_default();

    ScrollArea::both().auto_shrink([false, false]).show(ui, |ui: &mut Ui| {
        Grid::new("record_table")
            .striped(true)
            .min_col_width(70.0)
            .show(ui, |ui: &mut Ui| {
                for col in ["date", "category", "region", "sales", "profit"] {
                    ui.strong(col);
                }
                for col in &extra_columns {
                    ui.strong(col);
                }
                ui.end_row();

                for rec in &view.records {
                    ui.label(rec.date.format("%Y-%m-%d").to_string());
                    ui.label(&rec.category);
                    ui.label(&rec.region);
                    ui.label(format!("{}", rec.sales));
                    ui.label(format!("{}", rec.profit));
                    for col in &extra_columns {
                        ui.label(rec.extra.get(col).map(String::as_str).unwrap_or(""));
                    }
                    ui.end_row();
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_csv(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records, {} categories, {} regions",
                    dataset.len(),
                    dataset.categories.len(),
                    dataset.regions.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

fn export_dialog(state: &mut AppState) {
    let (Some(dataset), Some(view)) = (&state.dataset, &state.view) else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(export::export_filename(Local::now().naive_local()))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::write_csv(view, &dataset.extra_columns, &path) {
            Ok(()) => {
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
