//! Policy file validation.
//!
//! Checks every field of a policy file before a strategy is built, so a bad
//! file fails with the section and key at fault rather than mid-run.

use crate::domain::error::SignalError;
use crate::domain::metadata::{AssetSpec, parse_anchor_list};
use crate::domain::policy::Action;
use crate::domain::rule_parser;
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalError> {
    validate_name(config)?;
    validate_default(config)?;
    min_history(config)?;
    validate_metadata(config)?;
    for guard in guard_names(config)? {
        validate_guard(config, &guard)?;
    }
    Ok(())
}

/// Guard section names from `[strategy] guards`, in precedence order.
pub fn guard_names(config: &dyn ConfigPort) -> Result<Vec<String>, SignalError> {
    let list = required(config, "strategy", "guards")?;
    let names: Vec<String> = list
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() {
        return Err(invalid("strategy", "guards", "no guards listed".into()));
    }

    let mut seen = HashSet::new();
    for name in &names {
        if matches!(name.as_str(), "strategy" | "metadata") {
            return Err(invalid(
                "strategy",
                "guards",
                format!("'{}' is a reserved section name", name),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(invalid(
                "strategy",
                "guards",
                format!("guard '{}' listed more than once", name),
            ));
        }
    }
    Ok(names)
}

fn validate_name(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("strategy", "name") {
        Some(s) if s.trim().is_empty() => Err(invalid(
            "strategy",
            "name",
            "name must not be empty".into(),
        )),
        _ => Ok(()),
    }
}

fn validate_default(config: &dyn ConfigPort) -> Result<(), SignalError> {
    match config.get_string("strategy", "default") {
        Some(s) if !s.trim().is_empty() => parse_action(&s, "strategy", "default").map(|_| ()),
        _ => Ok(()),
    }
}

fn validate_metadata(config: &dyn ConfigPort) -> Result<(), SignalError> {
    required(config, "metadata", "target")?
        .parse::<AssetSpec>()
        .map_err(|reason| invalid("metadata", "target", reason))?;

    let anchors = parse_anchor_list(&required(config, "metadata", "anchors")?)
        .map_err(|reason| invalid("metadata", "anchors", reason))?;
    if anchors.is_empty() {
        return Err(invalid("metadata", "anchors", "no anchors listed".into()));
    }
    Ok(())
}

fn validate_guard(config: &dyn ConfigPort, guard: &str) -> Result<(), SignalError> {
    parse_action(&required(config, guard, "action")?, guard, "action")?;

    let text = required(config, guard, "rule")?;
    if let Err(e) = rule_parser::parse(&text) {
        tracing::debug!(guard, "rule parse failed:\n{}", e.display_with_context(&text));
        return Err(e.into());
    }
    Ok(())
}

/// A non-empty trimmed value, or `ConfigMissing`.
pub(crate) fn required(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SignalError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(SignalError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

pub(crate) fn parse_action(value: &str, section: &str, key: &str) -> Result<Action, SignalError> {
    value.parse().map_err(|reason| invalid(section, key, reason))
}

pub(crate) fn min_history(config: &dyn ConfigPort) -> Result<Option<usize>, SignalError> {
    match config.get_string("strategy", "min_history") {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<usize>().map(Some).map_err(|_| {
            invalid(
                "strategy",
                "min_history",
                format!("expected a non-negative integer, found '{}'", s.trim()),
            )
        }),
    }
}

pub(crate) fn invalid(section: &str, key: &str, reason: String) -> SignalError {
    SignalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
