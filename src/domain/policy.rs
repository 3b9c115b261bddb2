//! Decision policy: an ordered guard list with a trailing default action.

use crate::domain::error::SignalError;
use crate::domain::feature::FeatureType;
use crate::domain::rule::{Rule, extract_features};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "HOLD" => Ok(Action::Hold),
            other => Err(format!("unknown action '{}', expected BUY, SELL or HOLD", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub name: String,
    pub rule: Rule,
    pub action: Action,
}

impl Guard {
    pub fn new(name: impl Into<String>, rule: Rule, action: Action) -> Self {
        Self {
            name: name.into(),
            rule,
            action,
        }
    }
}

/// Guards are consulted in declaration order; the first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub guards: Vec<Guard>,
    pub default_action: Action,
    /// Explicit warm-up floor. When `None` the floor is the largest window
    /// or lag used by any guard.
    pub min_history: Option<usize>,
}

impl Policy {
    pub fn new(guards: Vec<Guard>) -> Self {
        Self {
            guards,
            default_action: Action::Hold,
            min_history: None,
        }
    }

    pub fn with_default(mut self, action: Action) -> Self {
        self.default_action = action;
        self
    }

    pub fn with_min_history(mut self, rows: usize) -> Self {
        self.min_history = Some(rows);
        self
    }

    /// Rows `0..required_history()` always get the default action.
    pub fn required_history(&self) -> usize {
        self.min_history.unwrap_or_else(|| {
            self.guards
                .iter()
                .map(|g| g.rule.max_window())
                .max()
                .unwrap_or(0)
        })
    }

    /// Every feature read by any guard, de-duplicated, in first-seen order.
    pub fn feature_requests(&self) -> Vec<FeatureType> {
        let mut seen = HashSet::new();
        self.guards
            .iter()
            .flat_map(|g| extract_features(&g.rule))
            .filter(|f| seen.insert(f.clone()))
            .collect()
    }

    /// Structural checks that do not need any data.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.guards.is_empty() {
            return Err(SignalError::RuleInvalid {
                reason: "policy has no guards".into(),
            });
        }
        for guard in &self.guards {
            validate_rule(&guard.name, &guard.rule)?;
        }
        for feature in self.feature_requests() {
            feature.validate()?;
        }
        Ok(())
    }
}

fn validate_rule(guard: &str, rule: &Rule) -> Result<(), SignalError> {
    match rule {
        Rule::Above { .. } | Rule::Below { .. } => Ok(()),
        Rule::And(rules) | Rule::Or(rules) => {
            if rules.is_empty() {
                let kind = if matches!(rule, Rule::And(_)) { "AND" } else { "OR" };
                return Err(SignalError::RuleInvalid {
                    reason: format!("guard '{}': {} with no sub-rules", guard, kind),
                });
            }
            rules.iter().try_for_each(|r| validate_rule(guard, r))
        }
        Rule::Not(rule) => validate_rule(guard, rule),
        Rule::AnyOf { rule: inner, count } | Rule::AnyPrior { rule: inner, count } => {
            if *count == 0 {
                return Err(SignalError::InvalidWindow {
                    feature: rule.to_string(),
                    parameter: "count".into(),
                });
            }
            validate_rule(guard, inner)
        }
    }
}
