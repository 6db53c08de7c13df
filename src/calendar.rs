//! Calendar and fiscal bucketing.
//!
//! The fiscal year starts in July: July 2024 through June 2025 is fiscal year
//! 2024, with Q1 = Jul–Sep, Q2 = Oct–Dec, Q3 = Jan–Mar and Q4 = Apr–Jun.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::types::{DeliveryRecord, EnrichedRecord, FiscalQuarter};

/// Deliveries at or under this delay count as on time.
pub const ON_TIME_THRESHOLD_MINUTES: f64 = 15.0;

pub const FISCAL_YEAR_START_MONTH: u32 = 7;

pub fn is_on_time(delay_minutes: f64) -> bool {
    delay_minutes <= ON_TIME_THRESHOLD_MINUTES
}

pub fn is_late(delay_minutes: f64) -> bool {
    !is_on_time(delay_minutes)
}

pub fn fiscal_year(year: i32, month: u32) -> i32 {
    if month >= FISCAL_YEAR_START_MONTH {
        year
    } else {
        year - 1
    }
}

pub fn fiscal_quarter(month: u32) -> FiscalQuarter {
    match month {
        7..=9 => FiscalQuarter::Q1,
        10..=12 => FiscalQuarter::Q2,
        1..=3 => FiscalQuarter::Q3,
        // chrono months are 1..=12, so this arm is Apr–Jun.
        _ => FiscalQuarter::Q4,
    }
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn quarter_label(fiscal_year: i32, quarter: FiscalQuarter) -> String {
    format!("{}-{}", fiscal_year, quarter)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Derive every bucket field for one record. Pure and deterministic.
pub fn enrich(record: DeliveryRecord) -> EnrichedRecord {
    let date = record.date.date();
    let year = date.year();
    let month = date.month();
    let start = week_start(date);
    EnrichedRecord {
        year,
        month,
        iso_week: date.iso_week().week(),
        day_of_week: weekday_name(date.weekday()).to_string(),
        month_year: month_label(year, month),
        week_start: start,
        week_year: date_label(start),
        fiscal_year: fiscal_year(year, month),
        fiscal_quarter: fiscal_quarter(month),
        on_time: is_on_time(record.delay_minutes),
        record,
    }
}
