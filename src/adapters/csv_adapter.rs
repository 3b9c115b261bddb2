//! CSV candle files and signal output.
//!
//! A data directory holds one file per asset named `<SYMBOL>_<TIMEFRAME>.csv`
//! with a timestamp column and at least a `close` column. Standalone tables
//! (an already merged anchor file, say) can be read with [`read_candle_file`].

use crate::domain::columns::{
    TIMESTAMP_COLUMN, anchor_column, resolve_anchor_column, resolve_target_column,
};
use crate::domain::error::SignalError;
use crate::domain::metadata::AssetSpec;
use crate::domain::series::CandleTable;
use crate::domain::signal::SignalFrame;
use crate::ports::data_port::CandlePort;
use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, asset: &AssetSpec) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", asset.symbol, asset.timeframe))
    }
}

impl CandlePort for CsvAdapter {
    fn target_candles(&self, target: &AssetSpec) -> Result<CandleTable, SignalError> {
        read_candle_file(self.csv_path(target))
    }

    fn anchor_candles(&self, anchors: &[AssetSpec]) -> Result<CandleTable, SignalError> {
        let mut merged: BTreeMap<NaiveDateTime, Vec<Option<f64>>> = BTreeMap::new();

        for (slot, anchor) in anchors.iter().enumerate() {
            let table = read_candle_file(self.csv_path(anchor))?;
            let names: Vec<&str> = table.column_names().collect();
            let column = resolve_target_column(names.iter().copied())
                .or_else(|_| resolve_anchor_column(names.iter().copied(), &anchor.symbol))?;
            let values = &table
                .column(column)
                .ok_or_else(|| SignalError::schema(column, "column not found"))?
                .values;

            // Rows come back sorted, so a repeat sits next to its twin.
            if let Some(w) = table.timestamps.windows(2).find(|w| w[0] == w[1]) {
                return Err(SignalError::schema(
                    anchor_column(&anchor.symbol),
                    format!("duplicate timestamp {}", w[1]),
                ));
            }
            for (&timestamp, &value) in table.timestamps.iter().zip(values) {
                merged
                    .entry(timestamp)
                    .or_insert_with(|| vec![None; anchors.len()])[slot] = value;
            }
            tracing::debug!(anchor = %anchor, rows = table.row_count(), "loaded anchor candles");
        }

        let mut table = CandleTable::new(merged.keys().copied().collect());
        for (slot, anchor) in anchors.iter().enumerate() {
            let values = merged.values().map(|row| row[slot]).collect();
            table = table.with_column(anchor_column(&anchor.symbol), values);
        }
        Ok(table)
    }
}

pub fn read_candle_file<P: AsRef<Path>>(path: P) -> Result<CandleTable, SignalError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SignalError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    read_candle_table(file)
}

/// Read a candle table. The timestamp column is the one named `timestamp`
/// (any case), or the first column when none is. Every other column must be
/// numeric; empty cells are missing values. Rows are returned in timestamp
/// order.
pub fn read_candle_table<R: Read>(reader: R) -> Result<CandleTable, SignalError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(SignalError::Data {
            reason: "CSV has no header row".into(),
        });
    }

    let ts_index = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(TIMESTAMP_COLUMN))
        .unwrap_or(0);
    let value_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ts_index)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut rows: Vec<(NaiveDateTime, Vec<Option<f64>>)> = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let ts_str = record.get(ts_index).unwrap_or_default();
        let timestamp = parse_timestamp(ts_str).map_err(|reason| SignalError::Data {
            reason: format!("row {}: {}", line + 1, reason),
        })?;

        let mut values = Vec::with_capacity(value_columns.len());
        for (i, name) in &value_columns {
            let cell = record.get(*i).unwrap_or_default();
            values.push(parse_cell(cell).map_err(|reason| SignalError::Data {
                reason: format!("row {}, column '{}': {}", line + 1, name, reason),
            })?);
        }
        rows.push((timestamp, values));
    }

    rows.sort_by_key(|(timestamp, _)| *timestamp);

    let mut table = CandleTable::new(rows.iter().map(|(t, _)| *t).collect());
    for (slot, (_, name)) in value_columns.iter().enumerate() {
        let values = rows.iter().map(|(_, v)| v[slot]).collect();
        table = table.with_column(name.clone(), values);
    }
    Ok(table)
}

fn parse_cell(cell: &str) -> Result<Option<f64>, String> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| format!("invalid number '{}': {}", cell, e))
}

/// RFC 3339 (converted to UTC), `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// or integer epoch milliseconds.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(millis) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| format!("epoch milliseconds out of range: {}", millis));
    }
    Err(format!("unrecognised timestamp '{}'", s))
}

/// Write `timestamp,signal` rows.
pub fn write_signals<W: Write>(frame: &SignalFrame, writer: W) -> Result<(), SignalError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([TIMESTAMP_COLUMN, "signal"])?;
    for row in &frame.rows {
        wtr.write_record([
            row.timestamp.format(OUTPUT_FORMAT).to_string(),
            row.signal.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
