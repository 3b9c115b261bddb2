//! Fixed lag shift: SHIFT(f, k)[i] = f[i-k], undefined for i < k.

use crate::domain::feature::{FeaturePoint, FeatureSeries, FeatureType};

pub fn calculate_shift(source: &FeatureSeries, periods: usize) -> FeatureSeries {
    let values = source
        .values
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let lagged = if i >= periods {
                source.get(i - periods)
            } else {
                None
            };
            match lagged {
                Some(v) => FeaturePoint::defined(point.timestamp, v),
                None => FeaturePoint::undefined(point.timestamp),
            }
        })
        .collect();

    FeatureSeries {
        feature_type: FeatureType::shift(source.feature_type.clone(), periods),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature::pct_change::calculate_pct_change;
    use chrono::{NaiveDate, NaiveDateTime};

    fn make_column(prices: &[f64]) -> FeatureSeries {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let timestamps: Vec<NaiveDateTime> = (0..prices.len())
            .map(|i| start + chrono::Duration::hours(i as i64))
            .collect();
        FeatureSeries::from_column("close_BTC", &timestamps, prices)
    }

    #[test]
    fn shift_moves_values_forward() {
        let series = calculate_shift(&make_column(&[1.0, 2.0, 3.0, 4.0]), 2);

        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), None);
        assert_eq!(series.get(2), Some(1.0));
        assert_eq!(series.get(3), Some(2.0));
    }

    #[test]
    fn shift_keeps_timestamps() {
        let source = make_column(&[1.0, 2.0, 3.0]);
        let series = calculate_shift(&source, 1);
        for (a, b) in source.values.iter().zip(&series.values) {
            assert_eq!(a.timestamp, b.timestamp);
        }
    }

    #[test]
    fn shift_propagates_undefined() {
        // pct_change(1) is undefined at 0; shifted by 2 it is undefined through row 2.
        let returns = calculate_pct_change(&make_column(&[100.0, 103.0, 103.0, 103.0]), 1);
        let series = calculate_shift(&returns, 2);

        assert_eq!(series.get(2), None);
        assert!(series.get(3).is_some());
        assert_eq!(
            series.feature_type,
            FeatureType::shift(FeatureType::pct_change("close_BTC", 1), 2)
        );
    }
}
