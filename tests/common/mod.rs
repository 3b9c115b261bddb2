#![allow(dead_code)]

use anchorsignal::domain::series::CandleTable;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

pub const BTC: &str = "BTC";
pub const ETH: &str = "ETH";

pub fn ts(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::hours(hour as i64)
}

pub fn hours(range: std::ops::Range<u32>) -> Vec<NaiveDateTime> {
    range.map(ts).collect()
}

pub fn symbols() -> Vec<String> {
    vec![BTC.to_string(), ETH.to_string()]
}

pub fn target_table(closes: &[f64]) -> CandleTable {
    CandleTable::new(hours(0..closes.len() as u32)).with_values("close", closes)
}

/// Anchor table with canonical column names on the same hourly grid as
/// [`target_table`].
pub fn anchor_table(btc: &[f64], eth: &[f64]) -> CandleTable {
    assert_eq!(btc.len(), eth.len());
    CandleTable::new(hours(0..btc.len() as u32))
        .with_values("close_BTC", btc)
        .with_values("close_ETH", eth)
}

/// Price path starting at `start` that applies each return in turn.
pub fn path(start: f64, returns: &[f64]) -> Vec<f64> {
    let mut prices = vec![start];
    for r in returns {
        let last = *prices.last().unwrap();
        prices.push(last * (1.0 + r));
    }
    prices
}

pub fn write_csv(dir: &Path, name: &str, header: &str, rows: &[(NaiveDateTime, f64)]) {
    let mut content = format!("{header}\n");
    for (t, v) in rows {
        content.push_str(&format!("{},{}\n", t.format("%Y-%m-%d %H:%M:%S"), v));
    }
    fs::write(dir.join(name), content).unwrap();
}

pub const POLICY_INI: &str = r#"
[strategy]
name = LDO anchor pump
description = Pump after an anchor pump, bail on a joint dump
default = HOLD
guards = anchor_pump, risk_off

[metadata]
target = LDO/1H
anchors = BTC/1H, ETH/1H

[anchor_pump]
action = BUY
rule = OR(ANY_PRIOR(ABOVE(PCT_CHANGE(close_BTC, 1), 0.02), 4), ANY_PRIOR(ABOVE(PCT_CHANGE(close_ETH, 1), 0.02), 4))

[risk_off]
action = SELL
rule = AND(BELOW(PCT_CHANGE(close, 1), -0.015), BELOW(PCT_CHANGE(close_BTC, 2), 0), BELOW(PCT_CHANGE(close_ETH, 2), 0))
"#;
