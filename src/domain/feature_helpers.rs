//! Feature derivation over an aligned frame.

use crate::domain::error::SignalError;
use crate::domain::feature::lag::calculate_shift;
use crate::domain::feature::pct_change::calculate_pct_change;
use crate::domain::feature::rolling_mean::calculate_rolling_mean;
use crate::domain::feature::{FeatureSeries, FeatureType};
use crate::domain::frame::AlignedFrame;
use std::collections::HashMap;

pub type FeatureMap = HashMap<FeatureType, FeatureSeries>;

/// Check every request against the frame before anything is computed:
/// windows must be positive and base columns must exist.
pub fn validate_requests(frame: &AlignedFrame, requests: &[FeatureType]) -> Result<(), SignalError> {
    for request in requests {
        request.validate()?;
        let column = request.base_column();
        if frame.column(column).is_none() {
            let available: Vec<&str> = frame.column_names().collect();
            return Err(SignalError::schema(
                column,
                format!(
                    "required by {} but not in frame (available: {})",
                    request,
                    available.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

/// Compute one feature column per request, index-aligned to `frame`.
///
/// Shared sub-features (e.g. the 1-step return under several shifts) are
/// computed once.
pub fn compute_features(
    frame: &AlignedFrame,
    requests: &[FeatureType],
) -> Result<FeatureMap, SignalError> {
    validate_requests(frame, requests)?;

    let mut features = FeatureMap::new();
    for request in requests {
        derive(frame, request, &mut features)?;
    }
    tracing::debug!(
        requested = requests.len(),
        computed = features.len(),
        rows = frame.len(),
        "derived features"
    );
    Ok(features)
}

fn derive(
    frame: &AlignedFrame,
    feature: &FeatureType,
    features: &mut FeatureMap,
) -> Result<(), SignalError> {
    if features.contains_key(feature) {
        return Ok(());
    }

    let series = match feature {
        FeatureType::Column(name) => {
            let values = frame
                .column(name)
                .ok_or_else(|| SignalError::schema(name.as_str(), "column not in frame"))?;
            FeatureSeries::from_column(name, frame.timestamps(), values)
        }
        FeatureType::PctChange { column, periods } => {
            let source = FeatureType::column(column.as_str());
            derive(frame, &source, features)?;
            calculate_pct_change(&features[&source], *periods)
        }
        FeatureType::RollingMean { column, window } => {
            let source = FeatureType::column(column.as_str());
            derive(frame, &source, features)?;
            calculate_rolling_mean(&features[&source], *window)
        }
        FeatureType::Shift { source, periods } => {
            derive(frame, source, features)?;
            calculate_shift(&features[source.as_ref()], *periods)
        }
    };

    features.insert(feature.clone(), series);
    Ok(())
}
