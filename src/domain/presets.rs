//! Built-in strategies.
//!
//! All presets trade LDO on the hourly timeframe against BTC and ETH.

use crate::domain::feature::FeatureType;
use crate::domain::metadata::{AssetSpec, CoinMetadata};
use crate::domain::policy::{Action, Guard, Policy};
use crate::domain::rule::{Operand, Rule};
use crate::domain::strategy::Strategy;
use std::fmt;
use std::str::FromStr;

const PUMP_THRESHOLD: f64 = 0.02;
const PUMP_LOOKBACK: usize = 4;
const DUMP_THRESHOLD: f64 = -0.015;
const LAGGED_PUMP_THRESHOLD: f64 = 0.03;
const CRASH_THRESHOLD: f64 = -0.05;
const TREND_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    AnchorPump,
    RiskOffFirst,
    LaggedPumpTrend,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::AnchorPump,
        Preset::RiskOffFirst,
        Preset::LaggedPumpTrend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::AnchorPump => "anchor-pump",
            Preset::RiskOffFirst => "risk-off-first",
            Preset::LaggedPumpTrend => "lagged-pump-trend",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::AnchorPump => {
                "BUY after a >2% hourly BTC or ETH pump in the prior 4 rows; SELL on a target dump while both anchors fall"
            }
            Preset::RiskOffFirst => "anchor-pump with the SELL guard checked before BUY",
            Preset::LaggedPumpTrend => {
                "BUY on a >3% anchor pump 4 rows back while the target holds its 3-row mean; SELL below the mean while both anchors fall"
            }
        }
    }

    /// Declared candles, available without building the policy.
    pub fn metadata(&self) -> CoinMetadata {
        ldo_metadata()
    }

    pub fn strategy(&self) -> Strategy {
        let policy = match self {
            Preset::AnchorPump => Policy::new(vec![anchor_pump_guard(), risk_off_guard()]),
            Preset::RiskOffFirst => Policy::new(vec![risk_off_guard(), anchor_pump_guard()]),
            Preset::LaggedPumpTrend => {
                Policy::new(vec![lagged_pump_guard(), trend_break_guard()])
            }
        };
        Strategy {
            name: self.name().to_string(),
            description: self.description().to_string(),
            metadata: self.metadata(),
            policy,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| format!("unknown preset '{}'", s.trim()))
    }
}

fn ldo_metadata() -> CoinMetadata {
    CoinMetadata::new(
        AssetSpec::new("LDO", "1H"),
        vec![AssetSpec::new("BTC", "1H"), AssetSpec::new("ETH", "1H")],
    )
}

fn anchors() -> [&'static str; 2] {
    ["close_BTC", "close_ETH"]
}

fn anchor_pump_guard() -> Guard {
    let pumps = anchors()
        .into_iter()
        .map(|col| {
            Rule::any_prior(
                Rule::above(FeatureType::pct_change(col, 1), PUMP_THRESHOLD),
                PUMP_LOOKBACK,
            )
        })
        .collect();
    Guard::new("anchor_pump", Rule::Or(pumps), Action::Buy)
}

/// Both anchors down over two rows.
fn anchors_falling() -> Vec<Rule> {
    anchors()
        .into_iter()
        .map(|col| Rule::below(FeatureType::pct_change(col, 2), 0.0))
        .collect()
}

fn risk_off_guard() -> Guard {
    let mut all = vec![Rule::below(FeatureType::pct_change("close", 1), DUMP_THRESHOLD)];
    all.extend(anchors_falling());
    Guard::new("risk_off", Rule::And(all), Action::Sell)
}

fn below_trend() -> Rule {
    Rule::below(
        Operand::column("close"),
        FeatureType::rolling_mean("close", TREND_WINDOW),
    )
}

fn lagged_pump_guard() -> Guard {
    let lagged = anchors()
        .into_iter()
        .map(|col| {
            Rule::above(
                FeatureType::shift(FeatureType::pct_change(col, 1), PUMP_LOOKBACK),
                LAGGED_PUMP_THRESHOLD,
            )
        })
        .collect();
    let rule = Rule::And(vec![
        Rule::Or(lagged),
        Rule::not(below_trend()),
        Rule::not(Rule::below(
            FeatureType::pct_change("close", 1),
            CRASH_THRESHOLD,
        )),
    ]);
    Guard::new("lagged_pump", rule, Action::Buy)
}

fn trend_break_guard() -> Guard {
    let mut all = vec![below_trend()];
    all.extend(anchors_falling());
    Guard::new("trend_break", Rule::And(all), Action::Sell)
}

pub fn preset_names() -> Vec<&'static str> {
    Preset::ALL.iter().map(|p| p.name()).collect()
}
