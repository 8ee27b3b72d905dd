use crate::data::equity::{EquityPoint, EquitySeries};
use crate::portfolio::OpenPosition;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct EquityRecord {
    timestamp: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct ReturnRecord {
    timestamp: String,
    #[serde(rename = "return")]
    ret: f64,
}

#[derive(Debug, Deserialize)]
struct YearRecord {
    year: i32,
    #[serde(rename = "return")]
    ret: f64,
}

#[derive(Debug, Deserialize)]
struct CashflowRecord {
    date: String,
    amount: f64,
}

//parses rfc3339, "yyyy-mm-dd hh:mm:ss" (utc) or a bare date (midnight utc)
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }

    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .context(format!("Failed to parse timestamp '{}'", text))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context(format!("Failed to build midnight for '{}'", text))?;
    Ok(midnight.and_utc())
}

//reads every record of a headed csv file
fn read_records<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut records = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        let record: T =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;
        records.push(record);
    }

    Ok(records)
}

//loads an equity curve (timestamp,value) exported by the engine
pub fn load_equity_csv<P: AsRef<Path>>(path: P) -> Result<EquitySeries> {
    let path = path.as_ref();
    let records: Vec<EquityRecord> = read_records(path)?;

    let mut points = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let timestamp = parse_timestamp(&record.timestamp)
            .context(format!("Bad timestamp at line {}", index + 2))?;
        points.push(EquityPoint::new(timestamp, record.value));
    }

    //sort by timestamp to ensure chronological order
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    EquitySeries::new(points).context(format!("Invalid equity curve in {:?}", path))
}

//loads per-bar returns (timestamp,return)
pub fn load_returns_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(DateTime<Utc>, f64)>> {
    let records: Vec<ReturnRecord> = read_records(path)?;

    let mut returns = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let timestamp = parse_timestamp(&record.timestamp)
            .context(format!("Bad timestamp at line {}", index + 2))?;
        returns.push((timestamp, record.ret));
    }

    returns.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(returns)
}

//loads calendar-year returns (year,return), keeping file order
pub fn load_per_year_csv<P: AsRef<Path>>(path: P) -> Result<IndexMap<i32, f64>> {
    let records: Vec<YearRecord> = read_records(path)?;
    Ok(records.into_iter().map(|r| (r.year, r.ret)).collect())
}

//loads external cashflows (date,amount), summing flows that share a date
pub fn load_cashflows_csv<P: AsRef<Path>>(path: P) -> Result<IndexMap<NaiveDate, f64>> {
    let records: Vec<CashflowRecord> = read_records(path)?;

    let mut flows = IndexMap::new();
    for (index, record) in records.into_iter().enumerate() {
        let date = parse_timestamp(&record.date)
            .context(format!("Bad date at line {}", index + 2))?
            .date_naive();
        *flows.entry(date).or_insert(0.0) += record.amount;
    }

    flows.sort_keys();
    Ok(flows)
}

//loads open positions (symbol,size,last_price), skipping flat ones
pub fn load_positions_csv<P: AsRef<Path>>(path: P) -> Result<Vec<OpenPosition>> {
    let positions: Vec<OpenPosition> = read_records(path)?;
    Ok(positions.into_iter().filter(|p| !p.is_flat()).collect())
}
