use crate::calendar::enrich;
use crate::error::{DashboardError, Result};
use crate::types::{DeliveryRecord, EnrichedRecord, RawRow, REQUIRED_COLUMNS};
use crate::util::{non_empty, parse_datetime_safe, parse_f64_safe};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl LoadReport {
    fn from_records(records: &[EnrichedRecord]) -> Self {
        let dates = records.iter().map(|r| r.calendar_date());
        LoadReport {
            total_rows: records.len(),
            first_date: dates.clone().min(),
            last_date: dates.max(),
        }
    }
}

/// Load and enrich the delivery table at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<EnrichedRecord>> {
    load_with_report(path).map(|(records, _)| records)
}

pub fn load_with_report<P: AsRef<Path>>(path: P) -> Result<(Vec<EnrichedRecord>, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        DashboardError::data_format(format!("cannot open {}: {}", path.display(), e))
    })?;
    let records = load_from_reader(file)?;
    let report = LoadReport::from_records(&records);
    info!(
        path = %path.display(),
        rows = report.total_rows,
        "loaded delivery data"
    );
    Ok((records, report))
}

/// Load and enrich from any CSV source. Any bad row aborts the whole load.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<EnrichedRecord>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::data_format(format!("cannot read header row: {}", e)))?
        .clone();
    validate_headers(&headers)?;

    let mut out = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row_no = idx + 1;
        let raw = result
            .map_err(|e| DashboardError::data_format(format!("row {}: {}", row_no, e)))?;
        let record = parse_row(raw, row_no)?;
        out.push(enrich(record));
    }
    debug!(rows = out.len(), "enriched delivery rows");
    Ok(out)
}

/// Require every canonical column, spelled exactly in lowercase. Any other
/// casing of a required column is rejected, even next to the canonical one.
pub fn validate_headers(headers: &StringRecord) -> Result<()> {
    for required in REQUIRED_COLUMNS {
        if let Some(found) = headers
            .iter()
            .find(|h| *h != required && h.eq_ignore_ascii_case(required))
        {
            return Err(DashboardError::data_format(format!(
                "column `{}` must be spelled `{}` (lowercase)",
                found, required
            )));
        }
        if !headers.iter().any(|h| h == required) {
            return Err(DashboardError::data_format(format!(
                "missing required column `{}`",
                required
            )));
        }
    }
    Ok(())
}

fn parse_row(row: RawRow, row_no: usize) -> Result<DeliveryRecord> {
    let bad = |column: &str, value: Option<&str>| {
        DashboardError::data_format(format!(
            "row {}: invalid {} value {:?}",
            row_no,
            column,
            value.unwrap_or("")
        ))
    };
    let number = |column: &str, value: Option<&str>| -> Result<f64> {
        parse_f64_safe(value).ok_or_else(|| bad(column, value))
    };

    let date = parse_datetime_safe(row.date.as_deref())
        .ok_or_else(|| bad("date", row.date.as_deref()))?;
    let delay_minutes = number("delay_minutes", row.delay_minutes.as_deref())?;
    let delivery_cost = number("delivery_cost", row.delivery_cost.as_deref())?;
    let fuel_cost = number("fuel_cost", row.fuel_cost.as_deref())?;
    let distance_km = number("distance_km", row.distance_km.as_deref())?;
    let customer_rating = number("customer_rating", row.customer_rating.as_deref())?;
    let driver =
        non_empty(row.driver.as_deref()).ok_or_else(|| bad("driver", row.driver.as_deref()))?;
    let delivery_id = non_empty(row.delivery_id.as_deref())
        .ok_or_else(|| bad("delivery_id", row.delivery_id.as_deref()))?;

    Ok(DeliveryRecord {
        delivery_id,
        date,
        delay_minutes,
        delivery_cost,
        fuel_cost,
        distance_km,
        customer_rating,
        driver,
    })
}
