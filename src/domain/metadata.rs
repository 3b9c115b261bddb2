//! Coin metadata: which target and anchor candles a strategy needs.
//!
//! A static declaration consumed by the data-sourcing side; the engine never
//! mutates it.

use crate::domain::error::SignalError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetSpec {
    pub symbol: String,
    pub timeframe: String,
}

impl AssetSpec {
    pub fn new(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            timeframe: timeframe.trim().to_uppercase(),
        }
    }
}

impl fmt::Display for AssetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbol, self.timeframe)
    }
}

/// Parses `SYMBOL/TIMEFRAME`, e.g. `BTC/1H`.
impl FromStr for AssetSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, timeframe) = s
            .split_once('/')
            .ok_or_else(|| format!("expected SYMBOL/TIMEFRAME, found '{}'", s.trim()))?;
        let spec = AssetSpec::new(symbol, timeframe);
        if spec.symbol.is_empty() || spec.timeframe.is_empty() {
            return Err(format!("expected SYMBOL/TIMEFRAME, found '{}'", s.trim()));
        }
        if !spec.symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!("symbol '{}' must be alphanumeric", spec.symbol));
        }
        Ok(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinMetadata {
    pub target: AssetSpec,
    pub anchors: Vec<AssetSpec>,
}

impl CoinMetadata {
    pub fn new(target: AssetSpec, anchors: Vec<AssetSpec>) -> Self {
        Self { target, anchors }
    }

    pub fn anchor_symbols(&self) -> Vec<String> {
        self.anchors.iter().map(|a| a.symbol.clone()).collect()
    }

    /// Anchors must be distinct and must not repeat the target symbol.
    pub fn validate(&self) -> Result<(), SignalError> {
        let mut seen = HashSet::new();
        seen.insert(self.target.symbol.as_str());
        for anchor in &self.anchors {
            if !seen.insert(anchor.symbol.as_str()) {
                return Err(SignalError::ConfigInvalid {
                    section: "metadata".into(),
                    key: "anchors".into(),
                    reason: format!("symbol {} declared more than once", anchor.symbol),
                });
            }
        }
        Ok(())
    }
}

/// Parse a comma-separated anchor list such as `BTC/1H, ETH/1H`.
pub fn parse_anchor_list(s: &str) -> Result<Vec<AssetSpec>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<AssetSpec>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ldo() -> CoinMetadata {
        CoinMetadata::new(
            AssetSpec::new("LDO", "1H"),
            vec![AssetSpec::new("BTC", "1H"), AssetSpec::new("ETH", "1H")],
        )
    }

    #[test]
    fn asset_spec_parse_normalises_case() {
        let spec: AssetSpec = " btc / 1h ".parse().unwrap();
        assert_eq!(spec, AssetSpec::new("BTC", "1H"));
        assert_eq!(spec.to_string(), "BTC/1H");
    }

    #[test]
    fn asset_spec_parse_errors() {
        assert!("BTC".parse::<AssetSpec>().is_err());
        assert!("/1H".parse::<AssetSpec>().is_err());
        assert!("BTC/".parse::<AssetSpec>().is_err());
        assert!("BTC-USD/1H".parse::<AssetSpec>().is_err());
    }

    #[test]
    fn anchor_list_parse() {
        let anchors = parse_anchor_list("BTC/1H, ETH/1H,").unwrap();
        assert_eq!(
            anchors,
            vec![AssetSpec::new("BTC", "1H"), AssetSpec::new("ETH", "1H")]
        );
        assert!(parse_anchor_list("BTC/1H, ETH").is_err());
    }

    #[test]
    fn anchor_symbols_follow_declaration_order() {
        assert_eq!(ldo().anchor_symbols(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn validate_rejects_duplicates() {
        assert!(ldo().validate().is_ok());

        let mut dup = ldo();
        dup.anchors.push(AssetSpec::new("btc", "4h"));
        assert!(matches!(
            dup.validate().unwrap_err(),
            SignalError::ConfigInvalid { .. }
        ));

        let self_anchor = CoinMetadata::new(
            AssetSpec::new("BTC", "1H"),
            vec![AssetSpec::new("BTC", "1H")],
        );
        assert!(self_anchor.validate().is_err());
    }
}
