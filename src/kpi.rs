use crate::calendar::is_late;
use crate::types::{EnrichedRecord, KpiSummary};
use crate::util::{average, percentage, round_to};

/// Mean delay over late deliveries only (delay above the on-time threshold).
/// Returns 0 when nothing was late.
pub fn mean_late_delay(records: &[EnrichedRecord]) -> f64 {
    let late: Vec<f64> = records
        .iter()
        .map(|r| r.record.delay_minutes)
        .filter(|d| is_late(*d))
        .collect();
    average(&late)
}

/// Whole-range KPIs. An empty slice yields an all-zero summary.
pub fn summarize(records: &[EnrichedRecord]) -> KpiSummary {
    let total_deliveries = records.len();
    let on_time = records.iter().filter(|r| r.on_time).count();
    let ratings: Vec<f64> = records.iter().map(|r| r.record.customer_rating).collect();
    KpiSummary {
        total_deliveries,
        on_time_rate: round_to(percentage(on_time, total_deliveries), 1),
        avg_delay: round_to(mean_late_delay(records), 1),
        total_cost: records.iter().map(|r| r.record.delivery_cost).sum(),
        total_distance: records.iter().map(|r| r.record.distance_km).sum(),
        avg_rating: round_to(average(&ratings), 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::enrich;
    use crate::types::DeliveryRecord;
    use chrono::NaiveDate;

    fn rec(day: u32, delay: f64, cost: f64, rating: f64) -> EnrichedRecord {
        enrich(DeliveryRecord {
            delivery_id: format!("D{}", day),
            date: NaiveDate::from_ymd_opt(2024, 7, day)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            delay_minutes: delay,
            delivery_cost: cost,
            fuel_cost: 0.0,
            distance_km: 12.5,
            customer_rating: rating,
            driver: "Ben".to_string(),
        })
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.total_deliveries, 0);
        assert_eq!(s.on_time_rate, 0.0);
        assert_eq!(s.avg_delay, 0.0);
        assert_eq!(s.total_cost, 0.0);
        assert_eq!(s.total_distance, 0.0);
        assert_eq!(s.avg_rating, 0.0);
    }

    #[test]
    fn avg_delay_counts_only_late_deliveries() {
        let records = vec![rec(5, 10.0, 100.0, 4.0), rec(6, 20.0, 200.0, 5.0)];
        let s = summarize(&records);
        assert_eq!(s.total_deliveries, 2);
        assert_eq!(s.on_time_rate, 50.0);
        assert_eq!(s.avg_delay, 20.0);
        assert_eq!(s.total_cost, 300.0);
        assert_eq!(s.total_distance, 25.0);
        assert_eq!(s.avg_rating, 4.5);
    }

    #[test]
    fn exactly_fifteen_minutes_is_not_late() {
        let records = vec![rec(1, 15.0, 1.0, 3.0), rec(2, 15.0, 1.0, 3.0)];
        assert_eq!(mean_late_delay(&records), 0.0);
        assert_eq!(summarize(&records).on_time_rate, 100.0);
    }

    #[test]
    fn rating_is_rounded_to_two_decimals() {
        let records = vec![
            rec(1, 0.0, 1.0, 4.0),
            rec(2, 0.0, 1.0, 4.0),
            rec(3, 0.0, 1.0, 5.0),
        ];
        assert_eq!(summarize(&records).avg_rating, 4.33);
    }
}
