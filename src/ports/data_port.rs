//! Candle data port trait.

use crate::domain::error::SignalError;
use crate::domain::metadata::AssetSpec;
use crate::domain::series::CandleTable;

pub trait CandlePort {
    /// Target candles with a `close` column.
    fn target_candles(&self, target: &AssetSpec) -> Result<CandleTable, SignalError>;

    /// One table holding a `close_<SYMBOL>` column per anchor, rows on the
    /// union of the anchors' timestamps.
    fn anchor_candles(&self, anchors: &[AssetSpec]) -> Result<CandleTable, SignalError>;
}
