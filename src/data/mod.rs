/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  sample_data.csv / user CSV
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, category/region/date indices
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  summary, grouped sums, rolling average, correlation
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  FilteredView → CSV download
///   └──────────┘
/// ```
///
/// Every stage is a pure function of its inputs; the UI re-runs
/// filter → stats in full on each criteria change.

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
