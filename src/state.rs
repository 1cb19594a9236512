use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::GroupColors;
use crate::data::filter::{self, DateRange, FilterCriteria, FilteredView};
use crate::data::model::SalesDataset;

/// Rolling-window slider bounds, matching the dashboard's 3–30 day range.
pub const MIN_ROLLING_WINDOW: usize = 3;
pub const MAX_ROLLING_WINDOW: usize = 30;
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

// ---------------------------------------------------------------------------
// Analysis tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    TimeSeries,
    Categories,
    Regions,
    Details,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::TimeSeries, Tab::Categories, Tab::Regions, Tab::Details];

    pub fn label(self) -> &'static str {
        match self {
            Tab::TimeSeries => "📈 Time series",
            Tab::Categories => "📊 Categories",
            Tab::Regions => "🗺 Regions",
            Tab::Details => "🔍 Details",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `dataset` is immutable for the session; every interaction re-reads the
/// criteria and rebuilds `view` from scratch through `filter::apply`.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<SalesDataset>,

    /// Current filter selections, passed by value into the engine each run.
    pub criteria: FilterCriteria,

    /// Raw date inputs from the pickers. Kept separate from `criteria` so
    /// an incomplete or inverted pair maps to `date_range: None` (filter by
    /// category/region alone) instead of crashing or silently swapping.
    pub start_input: Option<NaiveDate>,
    pub end_input: Option<NaiveDate>,

    /// Output of the last pipeline run (None before the first load).
    pub view: Option<FilteredView>,

    /// Active analysis tab.
    pub tab: Tab,

    /// Rolling-average overlay on the time-series tab.
    pub show_rolling_average: bool,
    pub rolling_window: usize,

    /// Chart colours for categories and regions.
    pub category_colors: GroupColors,
    pub region_colors: GroupColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            criteria: FilterCriteria {
                date_range: None,
                categories: BTreeSet::new(),
                regions: BTreeSet::new(),
            },
            start_input: None,
            end_input: None,
            view: None,
            tab: Tab::default(),
            show_rolling_average: false,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            category_colors: GroupColors::default(),
            region_colors: GroupColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: select everything, run the pipeline.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.criteria = FilterCriteria::select_all(&dataset);
        let (start, end) = match dataset.date_bounds {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        self.start_input = start;
        self.end_input = end;

        self.category_colors = GroupColors::new(&dataset.categories);
        self.region_colors = GroupColors::new(&dataset.regions);

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Re-run the pipeline from the current criteria.
    pub fn refilter(&mut self) {
        self.criteria.date_range = match (self.start_input, self.end_input) {
            (Some(start), Some(end)) => DateRange::new(start, end),
            // One bound missing: explicit fallback, dates pass unfiltered.
            _ => None,
        };
        if let Some(ds) = &self.dataset {
            self.view = Some(filter::apply(ds, &self.criteria));
        }
    }

    /// Toggle a single category or region selection.
    pub fn toggle_category(&mut self, value: &str) {
        toggle(&mut self.criteria.categories, value);
        self.refilter();
    }

    pub fn toggle_region(&mut self, value: &str) {
        toggle(&mut self.criteria.regions, value);
        self.refilter();
    }

    /// Select all / none for the category filter.
    pub fn select_all_categories(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria.categories = ds.categories.clone();
        }
        self.refilter();
    }

    pub fn select_no_categories(&mut self) {
        self.criteria.categories.clear();
        self.refilter();
    }

    pub fn select_all_regions(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria.regions = ds.regions.clone();
        }
        self.refilter();
    }

    pub fn select_no_regions(&mut self) {
        self.criteria.regions.clear();
        self.refilter();
    }

    /// Clamp and apply a new rolling window from the slider.
    pub fn set_rolling_window(&mut self, window: usize) {
        self.rolling_window = window.clamp(MIN_ROLLING_WINDOW, MAX_ROLLING_WINDOW);
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}
