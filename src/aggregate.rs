use crate::calendar::{date_label, month_label, quarter_label};
use crate::error::Result;
use crate::types::{AggregatedPeriod, EnrichedRecord, FiscalQuarter, Grouping, Metric};
use crate::util::{average, percentage, round_to};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Group key of a period. Within a single aggregation every key has the same
/// variant, so the derived ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum PeriodKey {
    Day(NaiveDate),
    Week(NaiveDate),
    Month(i32, u32),
    Quarter(i32, FiscalQuarter),
}

impl PeriodKey {
    fn of(record: &EnrichedRecord, grouping: Grouping) -> Self {
        match grouping {
            Grouping::Daily => PeriodKey::Day(record.calendar_date()),
            Grouping::Weekly => PeriodKey::Week(record.week_start),
            Grouping::Monthly => PeriodKey::Month(record.year, record.month),
            Grouping::Quarterly => PeriodKey::Quarter(record.fiscal_year, record.fiscal_quarter),
        }
    }

    fn label(&self) -> String {
        match *self {
            PeriodKey::Day(d) | PeriodKey::Week(d) => date_label(d),
            PeriodKey::Month(y, m) => month_label(y, m),
            PeriodKey::Quarter(fy, q) => quarter_label(fy, q),
        }
    }
}

/// Mean delay over every record, late or not. This is the per-period
/// `Avg_Delay`; the KPI card uses `kpi::mean_late_delay` instead.
pub fn mean_delay(records: &[&EnrichedRecord]) -> f64 {
    average(
        &records
            .iter()
            .map(|r| r.record.delay_minutes)
            .collect::<Vec<_>>(),
    )
}

/// Aggregate records into one row per period, ascending by period.
pub fn aggregate(records: &[EnrichedRecord], grouping: Grouping) -> Vec<AggregatedPeriod> {
    let mut groups: BTreeMap<PeriodKey, Vec<&EnrichedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(PeriodKey::of(r, grouping)).or_default().push(r);
    }

    groups
        .into_iter()
        .map(|(key, rows)| {
            let on_time = rows.iter().filter(|r| r.on_time).count();
            let ratings: Vec<f64> = rows.iter().map(|r| r.record.customer_rating).collect();
            AggregatedPeriod {
                period: key.label(),
                total_deliveries: rows.len(),
                on_time_rate: round_to(percentage(on_time, rows.len()), 1),
                avg_delay: round_to(mean_delay(&rows), 1),
                total_cost: round_to(rows.iter().map(|r| r.record.delivery_cost).sum(), 2),
                total_fuel: round_to(rows.iter().map(|r| r.record.fuel_cost).sum(), 2),
                total_distance: round_to(rows.iter().map(|r| r.record.distance_km).sum(), 1),
                avg_rating: round_to(average(&ratings), 2),
            }
        })
        .collect()
}

/// Same as [`aggregate`], with the grouping given by name (`"Daily"`,
/// `"Weekly"`, `"Monthly"` or `"Quarterly"`).
pub fn aggregate_by(records: &[EnrichedRecord], grouping: &str) -> Result<Vec<AggregatedPeriod>> {
    let grouping: Grouping = grouping.parse()?;
    Ok(aggregate(records, grouping))
}

/// One chart series: `(period label, value)` pairs in period order.
pub fn series(periods: &[AggregatedPeriod], metric: Metric) -> Vec<(String, f64)> {
    periods
        .iter()
        .map(|p| (p.period.clone(), p.value(metric)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::enrich;
    use crate::error::DashboardError;
    use crate::types::DeliveryRecord;

    fn rec(date: &str, delay: f64, cost: f64) -> EnrichedRecord {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        enrich(DeliveryRecord {
            delivery_id: format!("D-{}-{}", date, delay),
            date: date.and_hms_opt(12, 0, 0).unwrap(),
            delay_minutes: delay,
            delivery_cost: cost,
            fuel_cost: cost / 10.0,
            distance_km: 10.0,
            customer_rating: 4.0,
            driver: "Ana".to_string(),
        })
    }

    fn sample() -> Vec<EnrichedRecord> {
        vec![
            rec("2024-07-05", 10.0, 100.0),
            rec("2024-07-06", 20.0, 200.0),
            rec("2024-03-15", 0.0, 50.0),
            rec("2024-10-01", 40.0, 75.0),
            rec("2025-01-02", 5.0, 60.0),
            rec("2024-07-05", 15.0, 10.0),
        ]
    }

    #[test]
    fn quarterly_example_from_two_july_records() {
        let records = vec![rec("2024-07-05", 10.0, 100.0), rec("2024-07-06", 20.0, 200.0)];
        let rows = aggregate(&records, Grouping::Quarterly);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.period, "2024-Q1");
        assert_eq!(row.total_deliveries, 2);
        assert_eq!(row.on_time_rate, 50.0);
        assert_eq!(row.avg_delay, 15.0);
        assert_eq!(row.total_cost, 300.0);
        assert_eq!(row.total_fuel, 30.0);
        assert_eq!(row.total_distance, 20.0);
        assert_eq!(row.avg_rating, 4.0);
    }

    #[test]
    fn quarterly_orders_by_fiscal_year_then_quarter() {
        let labels: Vec<String> = aggregate(&sample(), Grouping::Quarterly)
            .into_iter()
            .map(|p| p.period)
            .collect();
        assert_eq!(labels, vec!["2023-Q3", "2024-Q1", "2024-Q2", "2024-Q3"]);
    }

    #[test]
    fn daily_weekly_monthly_labels_are_ascending() {
        let records = sample();
        let daily: Vec<String> = aggregate(&records, Grouping::Daily)
            .into_iter()
            .map(|p| p.period)
            .collect();
        assert_eq!(
            daily,
            vec!["2024-03-15", "2024-07-05", "2024-07-06", "2024-10-01", "2025-01-02"]
        );

        let weekly: Vec<String> = aggregate(&records, Grouping::Weekly)
            .into_iter()
            .map(|p| p.period)
            .collect();
        assert_eq!(
            weekly,
            vec!["2024-03-11", "2024-07-01", "2024-09-30", "2024-12-30"]
        );

        let monthly: Vec<String> = aggregate(&records, Grouping::Monthly)
            .into_iter()
            .map(|p| p.period)
            .collect();
        assert_eq!(monthly, vec!["2024-03", "2024-07", "2024-10", "2025-01"]);
    }

    #[test]
    fn period_counts_sum_to_input_length() {
        let records = sample();
        for g in Grouping::ALL {
            let total: usize = aggregate(&records, g)
                .iter()
                .map(|p| p.total_deliveries)
                .sum();
            assert_eq!(total, records.len(), "grouping {}", g);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        for g in Grouping::ALL {
            assert!(aggregate(&[], g).is_empty());
        }
    }

    #[test]
    fn avg_delay_includes_on_time_deliveries() {
        let rows = aggregate(&sample(), Grouping::Daily);
        let july_fifth = rows.iter().find(|p| p.period == "2024-07-05").unwrap();
        assert_eq!(july_fifth.total_deliveries, 2);
        assert_eq!(july_fifth.avg_delay, 12.5);
        assert_eq!(july_fifth.on_time_rate, 100.0);
    }

    #[test]
    fn rounding_of_rates() {
        let records = vec![
            rec("2024-07-05", 10.0, 1.0),
            rec("2024-07-05", 20.0, 1.0),
            rec("2024-07-05", 30.0, 1.0),
        ];
        let rows = aggregate(&records, Grouping::Daily);
        assert_eq!(rows[0].on_time_rate, 33.3);
    }

    #[test]
    fn aggregate_by_name_rejects_unknown_grouping() {
        assert!(matches!(
            aggregate_by(&sample(), "Yearly"),
            Err(DashboardError::UnsupportedGrouping(g)) if g == "Yearly"
        ));
        assert_eq!(aggregate_by(&sample(), "Monthly").unwrap().len(), 4);
    }

    #[test]
    fn series_follows_period_order() {
        let rows = aggregate(&sample(), Grouping::Monthly);
        let s = series(&rows, Metric::TotalDeliveries);
        assert_eq!(
            s,
            vec![
                ("2024-03".to_string(), 1.0),
                ("2024-07".to_string(), 3.0),
                ("2024-10".to_string(), 1.0),
                ("2025-01".to_string(), 1.0),
            ]
        );
    }
}
