//! Aggregation core of the delivery dashboard.
//!
//! Loads a delivery CSV, derives calendar and fiscal buckets for each row,
//! and answers the dashboard's queries: date filtering, per-period tables and
//! whole-range KPIs.

pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod error;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod output;
pub mod types;
pub mod util;

pub use aggregate::{aggregate, aggregate_by, series};
pub use cache::DatasetCache;
pub use error::{DashboardError, Result};
pub use filter::{date_bounds, default_date_range, filter_by_date_range};
pub use kpi::summarize;
pub use loader::{load, load_from_reader, load_with_report, LoadReport};
pub use types::{
    AggregatedPeriod, DateRange, DeliveryRecord, EnrichedRecord, FiscalQuarter, Grouping,
    KpiSummary, Metric,
};
