//! Strategies: a named policy together with the candles it needs.

use crate::domain::config_validation::{
    guard_names, invalid, min_history, parse_action, required, validate_strategy_config,
};
use crate::domain::engine;
use crate::domain::error::SignalError;
use crate::domain::metadata::{AssetSpec, CoinMetadata, parse_anchor_list};
use crate::domain::policy::{Action, Guard, Policy};
use crate::domain::rule_parser;
use crate::domain::series::CandleTable;
use crate::domain::signal::SignalFrame;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub metadata: CoinMetadata,
    pub policy: Policy,
}

impl Strategy {
    /// Target and anchors this strategy reads, in declaration order.
    pub fn metadata(&self) -> &CoinMetadata {
        &self.metadata
    }

    pub fn generate_signals(
        &self,
        target: &CandleTable,
        anchors: &CandleTable,
    ) -> Result<SignalFrame, SignalError> {
        tracing::info!(strategy = %self.name, target = %self.metadata.target, "generating signals");
        engine::generate_signals(target, anchors, &self.metadata.anchor_symbols(), &self.policy)
    }

    /// Build a strategy from a policy file. The file is validated first, so
    /// every error names the offending section and key.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SignalError> {
        validate_strategy_config(config)?;

        let name = config
            .get_string("strategy", "name")
            .unwrap_or_else(|| "Unnamed".to_string());
        let description = config
            .get_string("strategy", "description")
            .unwrap_or_default();

        let default_action = match config.get_string("strategy", "default") {
            Some(s) if !s.trim().is_empty() => parse_action(&s, "strategy", "default")?,
            _ => Action::Hold,
        };

        let mut guards = Vec::new();
        for guard_name in guard_names(config)? {
            let action = parse_action(
                &required(config, &guard_name, "action")?,
                &guard_name,
                "action",
            )?;
            let rule = rule_parser::parse(&required(config, &guard_name, "rule")?)?;
            guards.push(Guard::new(guard_name, rule, action));
        }

        let mut policy = Policy::new(guards).with_default(default_action);
        if let Some(rows) = min_history(config)? {
            policy = policy.with_min_history(rows);
        }
        policy.validate()?;

        let target: AssetSpec = required(config, "metadata", "target")?
            .parse()
            .map_err(|reason| invalid("metadata", "target", reason))?;
        let anchors = parse_anchor_list(&required(config, "metadata", "anchors")?)
            .map_err(|reason| invalid("metadata", "anchors", reason))?;
        let metadata = CoinMetadata::new(target, anchors);
        metadata.validate()?;

        Ok(Self {
            name,
            description,
            metadata,
            policy,
        })
    }
}
