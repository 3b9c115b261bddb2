//! Signal generation: alignment, feature derivation and ordered guard
//! evaluation for a whole batch.
//!
//! A run owns its frame and feature columns; nothing is shared between runs,
//! so independent runs may execute on separate threads.

use crate::domain::error::SignalError;
use crate::domain::feature_helpers::{FeatureMap, compute_features};
use crate::domain::frame::{AlignedFrame, align_tables};
use crate::domain::policy::{Action, Policy};
use crate::domain::rule_eval::evaluate;
use crate::domain::series::CandleTable;
use crate::domain::signal::{SignalFrame, SignalRow};

/// Run a policy over raw target and anchor tables.
///
/// Structural problems (bad policy, missing or ambiguous columns, empty join)
/// are reported before any row is evaluated.
pub fn generate_signals(
    target: &CandleTable,
    anchors: &CandleTable,
    anchor_symbols: &[String],
    policy: &Policy,
) -> Result<SignalFrame, SignalError> {
    policy.validate()?;
    let frame = align_tables(target, anchors, anchor_symbols)?;
    tracing::info!(
        target_rows = target.row_count(),
        anchor_rows = anchors.row_count(),
        aligned_rows = frame.len(),
        "aligned candles"
    );
    evaluate_frame(&frame, policy)
}

/// Run a policy over an already aligned frame.
pub fn evaluate_frame(frame: &AlignedFrame, policy: &Policy) -> Result<SignalFrame, SignalError> {
    policy.validate()?;
    if frame.is_empty() {
        return Err(SignalError::Alignment {
            reason: "aligned frame has no rows".into(),
        });
    }

    let features = compute_features(frame, &policy.feature_requests())?;
    let warmup = policy.required_history();

    let rows: Vec<SignalRow> = frame
        .timestamps()
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| SignalRow {
            timestamp,
            signal: if i < warmup {
                policy.default_action
            } else {
                decide(policy, &features, i)
            },
        })
        .collect();

    let signals = SignalFrame { rows };
    tracing::info!(
        rows = signals.len(),
        warmup,
        buy = signals.count(Action::Buy),
        sell = signals.count(Action::Sell),
        hold = signals.count(Action::Hold),
        "evaluated policy"
    );
    Ok(signals)
}

/// First matching guard's action at `row`, or the default. Does not apply
/// the warm-up floor.
pub fn decide(policy: &Policy, features: &FeatureMap, row: usize) -> Action {
    policy
        .guards
        .iter()
        .find(|g| evaluate(&g.rule, features, row))
        .map(|g| g.action)
        .unwrap_or(policy.default_action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature::FeatureType;
    use crate::domain::policy::Guard;
    use crate::domain::rule::{Operand, Rule};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn tables(target: &[f64], btc: &[f64]) -> (CandleTable, CandleTable) {
        let times: Vec<NaiveDateTime> = (0..target.len()).map(|h| ts(h as u32)).collect();
        (
            CandleTable::new(times.clone()).with_values("close", target),
            CandleTable::new(times).with_values("close_BTC", btc),
        )
    }

    fn above_policy(threshold: f64) -> Policy {
        Policy::new(vec![Guard::new(
            "high",
            Rule::above(Operand::column("close"), threshold),
            Action::Buy,
        )])
    }

    #[test]
    fn one_signal_per_aligned_row() {
        let (target, anchors) = tables(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]);
        let signals =
            generate_signals(&target, &anchors, &["BTC".to_string()], &above_policy(1.5)).unwrap();

        assert_eq!(signals.len(), 3);
        assert_eq!(signals.actions(), vec![Action::Hold, Action::Buy, Action::Buy]);
        assert_eq!(signals.rows[2].timestamp, ts(2));
    }

    #[test]
    fn warmup_forces_default_even_when_guard_true() {
        let (target, anchors) = tables(&[5.0, 5.0, 5.0, 5.0], &[1.0; 4]);
        let policy = above_policy(1.0).with_min_history(2);

        let signals = generate_signals(&target, &anchors, &["BTC".to_string()], &policy).unwrap();

        assert_eq!(
            signals.actions(),
            vec![Action::Hold, Action::Hold, Action::Buy, Action::Buy]
        );
    }

    #[test]
    fn default_action_is_configurable() {
        let (target, anchors) = tables(&[1.0, 1.0], &[1.0, 1.0]);
        let policy = above_policy(10.0).with_default(Action::Sell);

        let signals = generate_signals(&target, &anchors, &["BTC".to_string()], &policy).unwrap();

        assert_eq!(signals.actions(), vec![Action::Sell, Action::Sell]);
    }

    #[test]
    fn first_matching_guard_wins() {
        let (target, anchors) = tables(&[5.0], &[1.0]);
        let policy = Policy::new(vec![
            Guard::new("a", Rule::above(Operand::column("close"), 1.0), Action::Sell),
            Guard::new("b", Rule::above(Operand::column("close"), 2.0), Action::Buy),
        ]);

        let signals = generate_signals(&target, &anchors, &["BTC".to_string()], &policy).unwrap();

        assert_eq!(signals.actions(), vec![Action::Sell]);
    }

    #[test]
    fn invalid_policy_fails_before_alignment() {
        let (target, _) = tables(&[1.0], &[1.0]);
        let disjoint = CandleTable::new(vec![ts(9)]).with_values("close_BTC", &[1.0]);
        let policy = Policy::new(vec![Guard::new(
            "bad",
            Rule::above(FeatureType::pct_change("close", 0), 0.0),
            Action::Buy,
        )]);

        let err = generate_signals(&target, &disjoint, &["BTC".to_string()], &policy).unwrap_err();

        assert!(matches!(err, SignalError::InvalidWindow { .. }));
    }

    #[test]
    fn missing_feature_column_is_schema_error() {
        let (target, anchors) = tables(&[1.0, 2.0], &[1.0, 2.0]);
        let policy = Policy::new(vec![Guard::new(
            "eth",
            Rule::above(FeatureType::pct_change("close_ETH", 1), 0.0),
            Action::Buy,
        )]);

        let err = generate_signals(&target, &anchors, &["BTC".to_string()], &policy).unwrap_err();

        match err {
            SignalError::Schema { column, .. } => assert_eq!(column, "close_ETH"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decide_without_warmup() {
        let (target, anchors) = tables(&[1.0, 3.0], &[1.0, 1.0]);
        let frame = align_tables(&target, &anchors, &["BTC".to_string()]).unwrap();
        let policy = above_policy(2.0);
        let features = compute_features(&frame, &policy.feature_requests()).unwrap();

        assert_eq!(decide(&policy, &features, 0), Action::Hold);
        assert_eq!(decide(&policy, &features, 1), Action::Buy);
    }
}
