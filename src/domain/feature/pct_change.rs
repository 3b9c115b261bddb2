//! N-step percentage change.
//!
//! PCT_CHANGE(n)[i] = (V[i] - V[i-n]) / V[i-n]
//! Result is a fraction: 0.02 means +2%.
//! Warmup: first n rows undefined. A zero base gives a non-finite result,
//! which is stored as undefined.

use crate::domain::feature::{FeaturePoint, FeatureSeries, FeatureType};

pub fn calculate_pct_change(source: &FeatureSeries, periods: usize) -> FeatureSeries {
    let mut values = Vec::with_capacity(source.len());

    for (i, point) in source.values.iter().enumerate() {
        let prev = if i >= periods {
            source.get(i - periods)
        } else {
            None
        };

        let value = match (point.get(), prev) {
            (Some(curr), Some(prev)) => FeaturePoint::defined(point.timestamp, (curr - prev) / prev),
            _ => FeaturePoint::undefined(point.timestamp),
        };
        values.push(value);
    }

    FeatureSeries {
        feature_type: FeatureType::pct_change(source.feature_type.base_column(), periods),
        values,
    }
}
