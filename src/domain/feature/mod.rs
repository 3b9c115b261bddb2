//! Derived feature columns.
//!
//! This module provides types for representing feature values and series:
//! - `FeaturePoint`: A single point in a feature column, with an explicit validity flag
//! - `FeatureType`: Feature identity + parameters (serves as HashMap key)
//! - `FeatureSeries`: A feature column index-aligned to the frame

pub mod lag;
pub mod pct_change;
pub mod rolling_mean;

use crate::domain::error::SignalError;
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeaturePoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

impl FeaturePoint {
    pub fn defined(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            valid: value.is_finite(),
            value,
        }
    }

    pub fn undefined(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            valid: false,
            value: 0.0,
        }
    }

    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureType {
    /// A raw aligned column, defined on every row.
    Column(String),
    PctChange { column: String, periods: usize },
    RollingMean { column: String, window: usize },
    Shift {
        source: Box<FeatureType>,
        periods: usize,
    },
}

impl FeatureType {
    pub fn column(name: impl Into<String>) -> Self {
        FeatureType::Column(name.into())
    }

    pub fn pct_change(column: impl Into<String>, periods: usize) -> Self {
        FeatureType::PctChange {
            column: column.into(),
            periods,
        }
    }

    pub fn rolling_mean(column: impl Into<String>, window: usize) -> Self {
        FeatureType::RollingMean {
            column: column.into(),
            window,
        }
    }

    pub fn shift(source: FeatureType, periods: usize) -> Self {
        FeatureType::Shift {
            source: Box::new(source),
            periods,
        }
    }

    /// The raw column this feature is ultimately derived from.
    pub fn base_column(&self) -> &str {
        match self {
            FeatureType::Column(column)
            | FeatureType::PctChange { column, .. }
            | FeatureType::RollingMean { column, .. } => column,
            FeatureType::Shift { source, .. } => source.base_column(),
        }
    }

    /// Largest window or lag parameter appearing in this feature.
    pub fn max_window(&self) -> usize {
        match self {
            FeatureType::Column(_) => 0,
            FeatureType::PctChange { periods, .. } => *periods,
            FeatureType::RollingMean { window, .. } => *window,
            FeatureType::Shift { source, periods } => (*periods).max(source.max_window()),
        }
    }

    /// Reject zero windows and lags, innermost first.
    pub fn validate(&self) -> Result<(), SignalError> {
        let (parameter, value) = match self {
            FeatureType::Column(_) => return Ok(()),
            FeatureType::PctChange { periods, .. } => ("periods", *periods),
            FeatureType::RollingMean { window, .. } => ("window", *window),
            FeatureType::Shift { source, periods } => {
                source.validate()?;
                ("periods", *periods)
            }
        };
        if value == 0 {
            return Err(SignalError::InvalidWindow {
                feature: self.to_string(),
                parameter: parameter.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSeries {
    pub feature_type: FeatureType,
    pub values: Vec<FeaturePoint>,
}

impl FeatureSeries {
    /// Wrap a raw column; every row is defined.
    pub fn from_column(name: &str, timestamps: &[NaiveDateTime], values: &[f64]) -> Self {
        Self {
            feature_type: FeatureType::column(name),
            values: timestamps
                .iter()
                .zip(values)
                .map(|(&ts, &v)| FeaturePoint::defined(ts, v))
                .collect(),
        }
    }

    /// Value at `index`, or `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(FeaturePoint::get)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Column(name) => write!(f, "{}", name),
            FeatureType::PctChange { column, periods } => {
                write!(f, "PCT_CHANGE({}, {})", column, periods)
            }
            FeatureType::RollingMean { column, window } => {
                write!(f, "SMA({}, {})", column, window)
            }
            FeatureType::Shift { source, periods } => write!(f, "SHIFT({}, {})", source, periods),
        }
    }
}
