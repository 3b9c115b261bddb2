//! Rule AST data structures.
//!
//! This module defines the abstract syntax tree for guard conditions:
//! - `Operand`: What can be compared (constants, raw columns, derived features)
//! - `Rule`: The rule AST with comparison, composite, and windowed variants

use crate::domain::feature::FeatureType;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(f64),
    Feature(FeatureType),
}

impl Operand {
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Feature(FeatureType::column(name))
    }
}

impl From<FeatureType> for Operand {
    fn from(feature: FeatureType) -> Self {
        Operand::Feature(feature)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Constant(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Above {
        left: Operand,
        right: Operand,
    },
    Below {
        left: Operand,
        right: Operand,
    },
    And(Vec<Rule>),
    Or(Vec<Rule>),
    Not(Box<Rule>),
    /// Child true at least once in the last `count` rows, current row included.
    AnyOf {
        rule: Box<Rule>,
        count: usize,
    },
    /// Child true at least once in the `count` rows before the current one.
    AnyPrior {
        rule: Box<Rule>,
        count: usize,
    },
}

impl Rule {
    pub fn above(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::Above {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn below(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::Below {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn not(rule: Rule) -> Self {
        Rule::Not(Box::new(rule))
    }

    pub fn any_of(rule: Rule, count: usize) -> Self {
        Rule::AnyOf {
            rule: Box::new(rule),
            count,
        }
    }

    pub fn any_prior(rule: Rule, count: usize) -> Self {
        Rule::AnyPrior {
            rule: Box::new(rule),
            count,
        }
    }

    /// Largest window or lag parameter used anywhere in the rule, including
    /// features it reads.
    pub fn max_window(&self) -> usize {
        match self {
            Rule::Above { left, right } | Rule::Below { left, right } => {
                operand_window(left).max(operand_window(right))
            }
            Rule::And(rules) | Rule::Or(rules) => {
                rules.iter().map(Rule::max_window).max().unwrap_or(0)
            }
            Rule::Not(rule) => rule.max_window(),
            Rule::AnyOf { rule, count } | Rule::AnyPrior { rule, count } => {
                (*count).max(rule.max_window())
            }
        }
    }
}

fn operand_window(operand: &Operand) -> usize {
    match operand {
        Operand::Constant(_) => 0,
        Operand::Feature(feature) => feature.max_window(),
    }
}

/// Collect every feature a rule reads, in first-seen order.
pub fn extract_features(rule: &Rule) -> Vec<FeatureType> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    collect_features(rule, &mut seen, &mut out);
    out
}

fn collect_features(rule: &Rule, seen: &mut HashSet<FeatureType>, out: &mut Vec<FeatureType>) {
    match rule {
        Rule::Above { left, right } | Rule::Below { left, right } => {
            for operand in [left, right] {
                if let Operand::Feature(f) = operand {
                    if seen.insert(f.clone()) {
                        out.push(f.clone());
                    }
                }
            }
        }
        Rule::And(rules) | Rule::Or(rules) => {
            for r in rules {
                collect_features(r, seen, out);
            }
        }
        Rule::Not(rule) | Rule::AnyOf { rule, .. } | Rule::AnyPrior { rule, .. } => {
            collect_features(rule, seen, out)
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Feature(feature) => write!(f, "{}", feature),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, rules: &[Rule]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, r) in rules.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", r)?;
    }
    write!(f, ")")
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Above { left, right } => write!(f, "ABOVE({}, {})", left, right),
            Rule::Below { left, right } => write!(f, "BELOW({}, {})", left, right),
            Rule::And(rules) => write_list(f, "AND", rules),
            Rule::Or(rules) => write_list(f, "OR", rules),
            Rule::Not(rule) => write!(f, "NOT({})", rule),
            Rule::AnyOf { rule, count } => write!(f, "ANY_OF({}, {})", rule, count),
            Rule::AnyPrior { rule, count } => write!(f, "ANY_PRIOR({}, {})", rule, count),
        }
    }
}
