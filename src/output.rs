use crate::error::Result;
use crate::types::KpiSummary;
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize, P: AsRef<Path>>(path: P, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render up to `max_rows` rows as a markdown table, or `None` if there are none.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

pub fn kpi_cards(summary: &KpiSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Total Deliveries", format_int(summary.total_deliveries)),
        ("On-Time Rate", format!("{}%", format_number(summary.on_time_rate, 1))),
        ("Avg Delay (late)", format!("{} min", format_number(summary.avg_delay, 1))),
        ("Total Cost", format_number(summary.total_cost, 2)),
        ("Total Distance", format!("{} km", format_number(summary.total_distance, 1))),
        ("Avg Rating", format_number(summary.avg_rating, 2)),
    ]
}

pub fn print_kpi_cards(summary: &KpiSummary) {
    for (label, value) in kpi_cards(summary) {
        println!("{:<18} {}", label, value);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AggregatedPeriod;

    fn period(label: &str) -> AggregatedPeriod {
        AggregatedPeriod {
            period: label.to_string(),
            total_deliveries: 2,
            on_time_rate: 50.0,
            avg_delay: 15.0,
            total_cost: 300.0,
            total_fuel: 45.5,
            total_distance: 20.0,
            avg_rating: 4.25,
        }
    }

    #[test]
    fn csv_uses_chart_column_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("periods.csv");
        write_csv(&path, &[period("2024-Q1")]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Period,Total_Deliveries,On_Time_Rate,Avg_Delay,Total_Cost,Total_Fuel,Total_Distance,Avg_Rating"
        );
        assert!(lines.next().unwrap().starts_with("2024-Q1,2,50"));
    }

    #[test]
    fn json_summary_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kpi.json");
        let summary = KpiSummary {
            total_deliveries: 2,
            on_time_rate: 50.0,
            avg_delay: 20.0,
            total_cost: 300.0,
            total_distance: 20.5,
            avg_rating: 4.5,
        };
        write_json(&path, &summary).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_deliveries"], 2);
        assert_eq!(value["avg_delay"], 20.0);
    }

    #[test]
    fn table_render_respects_row_limit() {
        assert!(render_table::<AggregatedPeriod>(&[], 5).is_none());
        let rows = vec![period("2024-07"), period("2024-08"), period("2024-09")];
        let table = render_table(&rows, 2).unwrap();
        assert!(table.contains("2024-07"));
        assert!(table.contains("2024-08"));
        assert!(!table.contains("2024-09"));
        assert!(table.contains("Avg_Rating"));
        assert!(table.contains("4.25"));
        assert!(table.contains("50.0"));
    }

    #[test]
    fn cards_use_thousands_separators() {
        let summary = KpiSummary {
            total_deliveries: 12_345,
            on_time_rate: 87.25,
            avg_delay: 31.0,
            total_cost: 1_234_567.891,
            total_distance: 9_876.5,
            avg_rating: 4.1,
        };
        let cards = kpi_cards(&summary);
        assert_eq!(cards[0].1, "12,345");
        assert_eq!(cards[3].1, "1,234,567.89");
        assert_eq!(cards[4].1, "9,876.5 km");
    }
}
