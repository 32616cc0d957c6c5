//! Market data access port.

use crate::domain::error::EodtraderError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

pub trait MarketDataPort {
    /// Daily close history per symbol, up to `as_of`, reaching back
    /// `lookback_days` calendar days. The result may be partial: symbols
    /// without data are simply absent.
    fn price_history(
        &self,
        symbols: &[String],
        as_of: NaiveDate,
        lookback_days: u32,
    ) -> Result<HashMap<String, PriceSeries>, EodtraderError>;

    /// Latest available price, `None` when the symbol has none.
    fn current_price(&self, symbol: &str) -> Result<Option<f64>, EodtraderError>;

    fn is_market_open(&self) -> bool;

    /// The tradable universe in a stable order; that order breaks momentum
    /// ties, so providers must not shuffle it between calls.
    fn tradable_universe(&self) -> Result<Vec<String>, EodtraderError>;
}
