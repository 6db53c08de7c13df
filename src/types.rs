use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

use crate::error::DashboardError;

/// Canonical column names of the input table. Matching is exact and lowercase.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "delay_minutes",
    "delivery_cost",
    "fuel_cost",
    "distance_km",
    "customer_rating",
    "driver",
    "delivery_id",
];

/// One CSV row as read from disk, before any validation.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub date: Option<String>,
    pub delay_minutes: Option<String>,
    pub delivery_cost: Option<String>,
    pub fuel_cost: Option<String>,
    pub distance_km: Option<String>,
    pub customer_rating: Option<String>,
    pub driver: Option<String>,
    pub delivery_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub delivery_id: String,
    pub date: NaiveDateTime,
    pub delay_minutes: f64,
    pub delivery_cost: f64,
    pub fuel_cost: f64,
    pub distance_km: f64,
    pub customer_rating: f64,
    pub driver: String,
}

/// Fiscal quarter of a July–June fiscal year. Declaration order is sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FiscalQuarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl FiscalQuarter {
    pub fn number(self) -> u32 {
        match self {
            FiscalQuarter::Q1 => 1,
            FiscalQuarter::Q2 => 2,
            FiscalQuarter::Q3 => 3,
            FiscalQuarter::Q4 => 4,
        }
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// A delivery record with its calendar and fiscal buckets resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: DeliveryRecord,
    pub year: i32,
    pub month: u32,
    pub iso_week: u32,
    pub day_of_week: String,
    /// `YYYY-MM`
    pub month_year: String,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    /// `week_start` as `YYYY-MM-DD`; sortable and groupable.
    pub week_year: String,
    pub fiscal_year: i32,
    pub fiscal_quarter: FiscalQuarter,
    pub on_time: bool,
}

impl EnrichedRecord {
    pub fn calendar_date(&self) -> NaiveDate {
        self.record.date.date()
    }
}

/// Aggregation granularity for period tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grouping {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl Grouping {
    pub const ALL: [Grouping; 4] = [
        Grouping::Daily,
        Grouping::Weekly,
        Grouping::Monthly,
        Grouping::Quarterly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Grouping::Daily => "Daily",
            Grouping::Weekly => "Weekly",
            Grouping::Monthly => "Monthly",
            Grouping::Quarterly => "Quarterly",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grouping::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| DashboardError::UnsupportedGrouping(s.to_string()))
    }
}

fn display_1dp(v: &f64) -> String {
    format!("{:.1}", v)
}

fn display_2dp(v: &f64) -> String {
    format!("{:.2}", v)
}

/// One row of a period table. Field names in CSV/JSON and tables match the
/// chart column names used by the presentation layer.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct AggregatedPeriod {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Total_Deliveries")]
    #[tabled(rename = "Total_Deliveries")]
    pub total_deliveries: usize,
    #[serde(rename = "On_Time_Rate")]
    #[tabled(rename = "On_Time_Rate", display_with = "display_1dp")]
    pub on_time_rate: f64,
    /// Mean delay over every delivery in the period, late or not.
    #[serde(rename = "Avg_Delay")]
    #[tabled(rename = "Avg_Delay", display_with = "display_1dp")]
    pub avg_delay: f64,
    #[serde(rename = "Total_Cost")]
    #[tabled(rename = "Total_Cost", display_with = "display_2dp")]
    pub total_cost: f64,
    #[serde(rename = "Total_Fuel")]
    #[tabled(rename = "Total_Fuel", display_with = "display_2dp")]
    pub total_fuel: f64,
    #[serde(rename = "Total_Distance")]
    #[tabled(rename = "Total_Distance", display_with = "display_1dp")]
    pub total_distance: f64,
    #[serde(rename = "Avg_Rating")]
    #[tabled(rename = "Avg_Rating", display_with = "display_2dp")]
    pub avg_rating: f64,
}

/// A named y-axis series of [`AggregatedPeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TotalDeliveries,
    OnTimeRate,
    AvgDelay,
    TotalCost,
    TotalFuel,
    TotalDistance,
    AvgRating,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::TotalDeliveries,
        Metric::OnTimeRate,
        Metric::AvgDelay,
        Metric::TotalCost,
        Metric::TotalFuel,
        Metric::TotalDistance,
        Metric::AvgRating,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            Metric::TotalDeliveries => "Total_Deliveries",
            Metric::OnTimeRate => "On_Time_Rate",
            Metric::AvgDelay => "Avg_Delay",
            Metric::TotalCost => "Total_Cost",
            Metric::TotalFuel => "Total_Fuel",
            Metric::TotalDistance => "Total_Distance",
            Metric::AvgRating => "Avg_Rating",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column_name() == s)
            .ok_or_else(|| DashboardError::UnsupportedMetric(s.to_string()))
    }
}

impl AggregatedPeriod {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::TotalDeliveries => self.total_deliveries as f64,
            Metric::OnTimeRate => self.on_time_rate,
            Metric::AvgDelay => self.avg_delay,
            Metric::TotalCost => self.total_cost,
            Metric::TotalFuel => self.total_fuel,
            Metric::TotalDistance => self.total_distance,
            Metric::AvgRating => self.avg_rating,
        }
    }
}

/// Whole-range KPIs for the card row of the dashboard.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KpiSummary {
    pub total_deliveries: usize,
    pub on_time_rate: f64,
    /// Mean delay over late deliveries only.
    pub avg_delay: f64,
    pub total_cost: f64,
    pub total_distance: f64,
    pub avg_rating: f64,
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
