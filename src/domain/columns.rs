//! Price column name normalisation.
//!
//! Candle tables arrive with loosely named columns (`close_BTC`, `Close_btc`,
//! `CLOSE-BTC-1H`). These helpers map them onto the canonical names used in
//! the aligned frame: `close` for the target and `close_<SYMBOL>` for anchors.

use crate::domain::error::SignalError;

pub const PRICE_FIELD: &str = "close";
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Canonical aligned-frame column name for an anchor symbol.
pub fn anchor_column(symbol: &str) -> String {
    format!("{}_{}", PRICE_FIELD, symbol.to_uppercase())
}

fn tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

// `close_btc_1h` and `closebtc` both carry the token; `close_btcusdt` does not.
fn has_symbol_token(name: &str, symbol: &str) -> bool {
    let tokens = tokens(name);
    match tokens.split_first() {
        Some((head, rest)) => {
            rest.iter().any(|t| t == symbol) || *head == format!("{PRICE_FIELD}{symbol}")
        }
        None => false,
    }
}

fn is_price_column(name: &str) -> bool {
    name.trim().to_lowercase().starts_with(PRICE_FIELD)
}

/// Find the target's price column: exactly `close`, compared case-insensitively
/// after trimming.
pub fn resolve_target_column<'a, I>(names: I) -> Result<&'a str, SignalError>
where
    I: IntoIterator<Item = &'a str>,
{
    let matches: Vec<&str> = names
        .into_iter()
        .filter(|n| n.trim().eq_ignore_ascii_case(PRICE_FIELD))
        .collect();
    match matches.as_slice() {
        [one] => Ok(*one),
        [] => Err(SignalError::schema(PRICE_FIELD, "target table has no price column")),
        _ => Err(SignalError::schema(
            PRICE_FIELD,
            format!("ambiguous target price column: {}", matches.join(", ")),
        )),
    }
}

/// Find the price column belonging to `symbol` in an anchor table.
///
/// Candidates are columns starting with `close` (any case). A candidate whose
/// name contains the symbol as a separate token wins over one that merely
/// contains it as a substring; more than one winner at the same level is an
/// ambiguity error.
pub fn resolve_anchor_column<'a, I>(names: I, symbol: &str) -> Result<&'a str, SignalError>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = symbol.to_lowercase();
    let candidates: Vec<&str> = names.into_iter().filter(|n| is_price_column(n)).collect();

    let token_matches: Vec<&str> = candidates
        .iter()
        .copied()
        .filter(|n| has_symbol_token(n, &wanted))
        .collect();
    let chosen = if token_matches.is_empty() {
        candidates
            .iter()
            .copied()
            .filter(|n| n.trim().to_lowercase()[PRICE_FIELD.len()..].contains(&wanted))
            .collect()
    } else {
        token_matches
    };

    let column = anchor_column(symbol);
    match chosen.as_slice() {
        [one] => Ok(*one),
        [] => Err(SignalError::schema(
            column,
            format!("no price column for anchor {symbol}"),
        )),
        _ => Err(SignalError::schema(
            column,
            format!(
                "ambiguous price column for anchor {symbol}: {}",
                chosen.join(", ")
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_column_is_uppercased() {
        assert_eq!(anchor_column("btc"), "close_BTC");
    }

    #[test]
    fn target_column_case_insensitive() {
        let names = ["timestamp", "open", "Close", "volume"];
        assert_eq!(resolve_target_column(names).unwrap(), "Close");
    }

    #[test]
    fn target_column_missing() {
        let err = resolve_target_column(["timestamp", "open"]).unwrap_err();
        assert!(matches!(err, SignalError::Schema { .. }));
    }

    #[test]
    fn target_column_ambiguous() {
        let err = resolve_target_column(["close", "CLOSE"]).unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn anchor_exact_name() {
        let names = ["timestamp", "close_BTC", "close_ETH"];
        assert_eq!(resolve_anchor_column(names, "BTC").unwrap(), "close_BTC");
        assert_eq!(resolve_anchor_column(names, "ETH").unwrap(), "close_ETH");
    }

    #[test]
    fn anchor_name_variations() {
        assert_eq!(
            resolve_anchor_column(["timestamp", "Close_btc", "CLOSE-ETH-1H"], "BTC").unwrap(),
            "Close_btc"
        );
        assert_eq!(
            resolve_anchor_column(["timestamp", "Close_btc", "CLOSE-ETH-1H"], "eth").unwrap(),
            "CLOSE-ETH-1H"
        );
        assert_eq!(
            resolve_anchor_column(["closeBTC"], "BTC").unwrap(),
            "closeBTC"
        );
    }

    #[test]
    fn anchor_token_beats_substring() {
        let names = ["close_ETH", "close_ETHW"];
        assert_eq!(resolve_anchor_column(names, "ETH").unwrap(), "close_ETH");
    }

    #[test]
    fn anchor_substring_fallback() {
        assert_eq!(
            resolve_anchor_column(["close_BTCUSDT"], "BTC").unwrap(),
            "close_BTCUSDT"
        );
    }

    #[test]
    fn anchor_ignores_non_price_columns() {
        let err = resolve_anchor_column(["volume_BTC", "open_BTC"], "BTC").unwrap_err();
        assert!(err.to_string().contains("no price column"));
    }

    #[test]
    fn anchor_ambiguous() {
        let err = resolve_anchor_column(["close_BTC", "Close_btc_2"], "BTC").unwrap_err();
        match err {
            SignalError::Schema { column, reason } => {
                assert_eq!(column, "close_BTC");
                assert!(reason.contains("ambiguous"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
