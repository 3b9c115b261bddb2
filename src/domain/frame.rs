//! Aligned frame: the inner join of target and anchor series on timestamp.

use crate::domain::columns::{
    PRICE_FIELD, anchor_column, resolve_anchor_column, resolve_target_column,
};
use crate::domain::error::SignalError;
use crate::domain::series::{CandleTable, ObservationSeries};
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Rows present in every joined series, ascending by timestamp. Every column
/// has a value on every row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrame {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<FrameColumn>,
}

impl AlignedFrame {
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Inner-join series on exact timestamp equality. Column names are the
/// series names.
pub fn align(series: &[ObservationSeries]) -> Result<AlignedFrame, SignalError> {
    let Some(first) = series.first() else {
        return Err(SignalError::Alignment {
            reason: "no series to align".into(),
        });
    };

    let mut seen = HashSet::new();
    for s in series {
        if !seen.insert(s.name()) {
            return Err(SignalError::schema(s.name(), "column joined more than once"));
        }
        if s.is_empty() {
            return Err(SignalError::Alignment {
                reason: format!("series {} has no observations", s.name()),
            });
        }
    }

    let mut common: BTreeSet<NaiveDateTime> =
        first.points().iter().map(|p| p.timestamp).collect();
    for s in &series[1..] {
        let present: HashSet<NaiveDateTime> = s.points().iter().map(|p| p.timestamp).collect();
        common.retain(|ts| present.contains(ts));
    }

    if common.is_empty() {
        let names: Vec<&str> = series.iter().map(|s| s.name()).collect();
        return Err(SignalError::Alignment {
            reason: format!("no overlapping timestamps across {}", names.join(", ")),
        });
    }

    let timestamps: Vec<NaiveDateTime> = common.into_iter().collect();
    let columns = series
        .iter()
        .map(|s| {
            let index: HashMap<NaiveDateTime, f64> =
                s.points().iter().map(|p| (p.timestamp, p.value)).collect();
            FrameColumn {
                name: s.name().to_string(),
                values: timestamps.iter().map(|ts| index[ts]).collect(),
            }
        })
        .collect();

    Ok(AlignedFrame {
        timestamps,
        columns,
    })
}

/// Normalise the target and anchor tables to canonical column names and
/// inner-join them. The target price column becomes `close`; each anchor's
/// becomes `close_<SYMBOL>`.
pub fn align_tables(
    target: &CandleTable,
    anchors: &CandleTable,
    anchor_symbols: &[String],
) -> Result<AlignedFrame, SignalError> {
    if target.row_count() == 0 {
        return Err(SignalError::Alignment {
            reason: "target table is empty".into(),
        });
    }
    if !anchor_symbols.is_empty() && anchors.row_count() == 0 {
        return Err(SignalError::Alignment {
            reason: "anchor table is empty".into(),
        });
    }

    let target_col = resolve_target_column(target.column_names())?;
    let mut series = vec![target.series(target_col, PRICE_FIELD)?];

    for symbol in anchor_symbols {
        let source = resolve_anchor_column(anchors.column_names(), symbol)?;
        let canonical = anchor_column(symbol);
        tracing::debug!(symbol = %symbol, source, canonical = %canonical, "resolved anchor column");
        series.push(anchors.series(source, &canonical)?);
    }

    align(&series)
}
