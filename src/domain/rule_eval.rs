//! Rule evaluation engine.
//!
//! Evaluates rules against pre-computed feature columns.
//!
//! # Evaluation Semantics
//!
//! - `ABOVE`/`BELOW`: strict `>` / `<` at the given row; `false` whenever
//!   either side is undefined at that row
//! - `AND`: Short-circuits on first `false`
//! - `OR`: Short-circuits on first `true`
//! - `NOT`: negates the child as evaluated, so `NOT` of an undefined
//!   comparison is `true`
//! - `ANY_OF(rule, N)`: Child true at least once in rows `[i-N+1, i]`
//! - `ANY_PRIOR(rule, N)`: Child true at least once in rows `[i-N, i-1]`
//!
//! Rows before the start of the frame are skipped by the windowed forms.

use crate::domain::feature::{FeatureSeries, FeatureType};
use crate::domain::rule::{Operand, Rule};
use std::collections::HashMap;

pub fn evaluate(
    rule: &Rule,
    features: &HashMap<FeatureType, FeatureSeries>,
    row: usize,
) -> bool {
    match rule {
        Rule::Above { left, right } => {
            match (
                resolve_operand(left, features, row),
                resolve_operand(right, features, row),
            ) {
                (Some(l), Some(r)) => l > r,
                _ => false,
            }
        }
        Rule::Below { left, right } => {
            match (
                resolve_operand(left, features, row),
                resolve_operand(right, features, row),
            ) {
                (Some(l), Some(r)) => l < r,
                _ => false,
            }
        }
        Rule::And(rules) => {
            for r in rules {
                if !evaluate(r, features, row) {
                    return false;
                }
            }
            true
        }
        Rule::Or(rules) => {
            for r in rules {
                if evaluate(r, features, row) {
                    return true;
                }
            }
            false
        }
        Rule::Not(rule) => !evaluate(rule, features, row),
        Rule::AnyOf { rule, count } => {
            if *count == 0 {
                return false;
            }
            let start = row.saturating_sub(*count - 1);
            (start..=row).any(|i| evaluate(rule, features, i))
        }
        Rule::AnyPrior { rule, count } => {
            let start = row.saturating_sub(*count);
            (start..row).any(|i| evaluate(rule, features, i))
        }
    }
}

/// `None` means undefined: a missing feature, a warm-up row, or a row past
/// the end of the column.
fn resolve_operand(
    operand: &Operand,
    features: &HashMap<FeatureType, FeatureSeries>,
    row: usize,
) -> Option<f64> {
    match operand {
        Operand::Constant(v) => Some(*v),
        Operand::Feature(feature) => features.get(feature)?.get(row),
    }
}
