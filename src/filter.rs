use crate::types::{DateRange, EnrichedRecord};
use chrono::{Days, NaiveDate};

/// Length of the default dashboard window, ending on the latest record.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 365;

/// Records whose calendar date lies in `start..=end`, cloned in input order.
/// An inverted range selects nothing.
pub fn filter_by_date_range(
    records: &[EnrichedRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<EnrichedRecord> {
    let range = DateRange { start, end };
    records
        .iter()
        .filter(|r| range.contains(r.calendar_date()))
        .cloned()
        .collect()
}

/// Earliest and latest calendar date in the data.
pub fn date_bounds(records: &[EnrichedRecord]) -> Option<DateRange> {
    let start = records.iter().map(|r| r.calendar_date()).min()?;
    let end = records.iter().map(|r| r.calendar_date()).max()?;
    Some(DateRange { start, end })
}

/// The last year of data, never reaching before the first record.
pub fn default_date_range(records: &[EnrichedRecord]) -> Option<DateRange> {
    let bounds = date_bounds(records)?;
    let start = bounds
        .end
        .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
        .unwrap_or(bounds.start)
        .max(bounds.start);
    Some(DateRange {
        start,
        end: bounds.end,
    })
}
