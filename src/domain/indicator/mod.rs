//! Technical indicator kernels.
//!
//! Pure functions of the input slice and parameters: no hidden state, no
//! caching. Each kernel returns `None` (not an error) when the series is too
//! short, and callers treat that as "exclude this symbol", never as a failure.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::ema;
pub use macd::{macd, macd_default, MacdSeries};
pub use rsi::{rsi, rsi_default, RsiSeries};

/// Which indicator could not be computed for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorUnavailable {
    Macd,
    Rsi,
}

/// Per-symbol indicator bundle, computed fresh each run with the default
/// parameter sets (MACD 12/26/9, RSI 14).
#[derive(Debug, Clone)]
pub struct IndicatorResult {
    pub macd: MacdSeries,
    pub rsi: RsiSeries,
}

impl IndicatorResult {
    pub fn compute(closes: &[f64]) -> Result<Self, IndicatorUnavailable> {
        let macd = macd_default(closes).ok_or(IndicatorUnavailable::Macd)?;
        let rsi = rsi_default(closes).ok_or(IndicatorUnavailable::Rsi)?;
        Ok(IndicatorResult { macd, rsi })
    }
}
