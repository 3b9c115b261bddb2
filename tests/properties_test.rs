//! Properties that hold for any candle input.

mod common;

use anchorsignal::domain::engine::generate_signals;
use anchorsignal::domain::feature::FeatureType;
use anchorsignal::domain::policy::{Action, Guard, Policy};
use anchorsignal::domain::presets::Preset;
use anchorsignal::domain::rule::Rule;
use anchorsignal::domain::series::CandleTable;
use common::*;
use proptest::prelude::*;

fn prices(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, len)
}

/// Target closes plus two anchor paths of the same length.
fn market() -> impl Strategy<Value = (Vec<f64>, Vec<f64>, Vec<f64>)> {
    (1usize..40).prop_flat_map(|n| (prices(n..n + 1), prices(n..n + 1), prices(n..n + 1)))
}

fn tables(target: &[f64], btc: &[f64], eth: &[f64]) -> (CandleTable, CandleTable) {
    (target_table(target), anchor_table(btc, eth))
}

fn run(policy: &Policy, target: &CandleTable, anchors: &CandleTable) -> Vec<Action> {
    generate_signals(target, anchors, &symbols(), policy)
        .unwrap()
        .actions()
}

proptest! {
    #[test]
    fn output_is_deterministic((t, b, e) in market()) {
        let (target, anchors) = tables(&t, &b, &e);
        for preset in Preset::ALL {
            let policy = preset.strategy().policy;
            prop_assert_eq!(run(&policy, &target, &anchors), run(&policy, &target, &anchors));
        }
    }

    #[test]
    fn one_ascending_row_per_input_row((t, b, e) in market()) {
        let (target, anchors) = tables(&t, &b, &e);
        let signals = generate_signals(
            &target,
            &anchors,
            &symbols(),
            &Preset::AnchorPump.strategy().policy,
        )
        .unwrap();

        prop_assert_eq!(signals.len(), t.len());
        prop_assert!(signals.rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn warmup_rows_get_default((t, b, e) in market(), floor in 0usize..10) {
        let (target, anchors) = tables(&t, &b, &e);
        let policy = Preset::AnchorPump
            .strategy()
            .policy
            .with_default(Action::Sell)
            .with_min_history(floor);

        let actions = run(&policy, &target, &anchors);

        for action in actions.iter().take(floor) {
            prop_assert_eq!(*action, Action::Sell);
        }
    }

    #[test]
    fn first_match_wins((t, b, e) in market(), x in -0.05f64..0.05, y in -0.05f64..0.05) {
        let (target, anchors) = tables(&t, &b, &e);
        let first = Guard::new(
            "first",
            Rule::above(FeatureType::pct_change("close_BTC", 1), x),
            Action::Sell,
        );
        let second = Guard::new(
            "second",
            Rule::below(FeatureType::pct_change("close", 2), y),
            Action::Buy,
        );
        let solo = |g: &Guard| run(&Policy::new(vec![g.clone()]).with_min_history(2), &target, &anchors);

        let combined = run(
            &Policy::new(vec![first.clone(), second.clone()]).with_min_history(2),
            &target,
            &anchors,
        );
        let (only_first, only_second) = (solo(&first), solo(&second));

        for i in 0..combined.len() {
            let expected = if only_first[i] == Action::Sell {
                Action::Sell
            } else if only_second[i] == Action::Buy {
                Action::Buy
            } else {
                Action::Hold
            };
            prop_assert_eq!(combined[i], expected);
        }
    }

    #[test]
    fn undefined_return_never_fires(
        (mut t, b, e) in market(),
        zeros in prop::collection::vec(any::<prop::sample::Index>(), 0..5),
    ) {
        for z in &zeros {
            let i = z.index(t.len());
            t[i] = 0.0;
        }
        let (target, anchors) = tables(&t, &b, &e);
        // Always true whenever the return is defined.
        let fires = Policy::new(vec![Guard::new(
            "any",
            Rule::below(FeatureType::pct_change("close", 1), f64::MAX),
            Action::Buy,
        )])
        .with_min_history(0);
        let negated = Policy::new(vec![Guard::new(
            "none",
            Rule::above(FeatureType::pct_change("close", 1), f64::MAX),
            Action::Buy,
        )])
        .with_min_history(0);

        let actions = run(&fires, &target, &anchors);
        prop_assert_eq!(actions[0], Action::Hold);
        for i in 1..t.len() {
            let defined = t[i - 1] != 0.0;
            prop_assert_eq!(actions[i] == Action::Buy, defined, "row {}", i);
        }
        prop_assert!(run(&negated, &target, &anchors).iter().all(|a| *a == Action::Hold));
    }
}
