//! Observation series and raw candle tables.
//!
//! A [`CandleTable`] is what the data-sourcing side hands over: a timestamp
//! column plus named numeric columns, any cell of which may be missing.
//! Each column is turned into an [`ObservationSeries`] before alignment.

use crate::domain::error::SignalError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Ordered `(timestamp, value)` pairs for one asset and one field.
///
/// Timestamps are strictly increasing; the constructor rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    name: String,
    points: Vec<Observation>,
}

impl ObservationSeries {
    pub fn new(name: impl Into<String>, points: Vec<Observation>) -> Result<Self, SignalError> {
        let name = name.into();
        if let Some(w) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            let reason = if w[1].timestamp == w[0].timestamp {
                format!("duplicate timestamp {}", w[1].timestamp)
            } else {
                format!(
                    "timestamps not strictly increasing ({} after {})",
                    w[1].timestamp, w[0].timestamp
                )
            };
            return Err(SignalError::schema(name, reason));
        }
        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleTable {
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<TableColumn>,
}

impl CandleTable {
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamps,
            columns: Vec::new(),
        }
    }

    /// Builder-style column insertion. Panics in debug builds if the column
    /// length does not match the timestamp count.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.timestamps.len());
        self.columns.push(TableColumn {
            name: name.into(),
            values,
        });
        self
    }

    /// Same as [`with_column`](Self::with_column) for fully populated columns.
    pub fn with_values(self, name: impl Into<String>, values: &[f64]) -> Self {
        let values = values.iter().copied().map(Some).collect();
        self.with_column(name, values)
    }

    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Extract one column as an observation series, renamed to `series_name`.
    /// Missing cells produce no observation.
    pub fn series(&self, column: &str, series_name: &str) -> Result<ObservationSeries, SignalError> {
        let col = self
            .column(column)
            .ok_or_else(|| SignalError::schema(column, "column not found"))?;
        if col.values.len() != self.timestamps.len() {
            return Err(SignalError::schema(
                column,
                format!(
                    "column has {} values but table has {} timestamps",
                    col.values.len(),
                    self.timestamps.len()
                ),
            ));
        }
        let points = self
            .timestamps
            .iter()
            .zip(&col.values)
            .filter_map(|(&timestamp, value)| {
                value
                    .filter(|v| v.is_finite())
                    .map(|value| Observation { timestamp, value })
            })
            .collect();
        ObservationSeries::new(series_name, points)
    }
}
