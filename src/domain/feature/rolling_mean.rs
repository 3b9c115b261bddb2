//! Rolling mean of width W.
//!
//! SMA(w)[i] = mean(V[i-w+1 ..= i])
//! Warmup: first w-1 rows undefined, and any window containing an
//! undefined source value is undefined.

use crate::domain::feature::{FeaturePoint, FeatureSeries, FeatureType};

pub fn calculate_rolling_mean(source: &FeatureSeries, window: usize) -> FeatureSeries {
    let mut values = Vec::with_capacity(source.len());

    for (i, point) in source.values.iter().enumerate() {
        if window == 0 || i + 1 < window {
            values.push(FeaturePoint::undefined(point.timestamp));
            continue;
        }

        let sum: Option<f64> = (i + 1 - window..=i).map(|j| source.get(j)).sum();
        values.push(match sum {
            Some(sum) => FeaturePoint::defined(point.timestamp, sum / window as f64),
            None => FeaturePoint::undefined(point.timestamp),
        });
    }

    FeatureSeries {
        feature_type: FeatureType::rolling_mean(source.feature_type.base_column(), window),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn make_column(prices: &[f64]) -> FeatureSeries {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let timestamps: Vec<NaiveDateTime> = (0..prices.len())
            .map(|i| start + chrono::Duration::hours(i as i64))
            .collect();
        FeatureSeries::from_column("close", &timestamps, prices)
    }

    #[test]
    fn rolling_mean_warmup() {
        let series = calculate_rolling_mean(&make_column(&[1.0, 2.0, 3.0, 4.0]), 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn rolling_mean_values() {
        let series = calculate_rolling_mean(&make_column(&[1.0, 2.0, 3.0, 4.0, 10.0]), 3);

        assert_relative_eq!(series.get(2).unwrap(), 2.0);
        assert_relative_eq!(series.get(3).unwrap(), 3.0);
        assert_relative_eq!(series.get(4).unwrap(), 17.0 / 3.0);
    }

    #[test]
    fn rolling_mean_width_one_is_identity() {
        let series = calculate_rolling_mean(&make_column(&[5.0, 6.0]), 1);
        assert_eq!(series.get(0), Some(5.0));
        assert_eq!(series.get(1), Some(6.0));
    }

    #[test]
    fn rolling_mean_over_undefined_source() {
        let mut source = make_column(&[1.0, 2.0, 3.0, 4.0]);
        source.values[1] = FeaturePoint::undefined(source.values[1].timestamp);

        let series = calculate_rolling_mean(&source, 2);

        assert_eq!(series.get(1), None);
        assert_eq!(series.get(2), None);
        assert_relative_eq!(series.get(3).unwrap(), 3.5);
    }
}
