//! Open positions and executed-trade records.

use chrono::NaiveDate;

/// A held position as reported by the position store. Quantity is always
/// positive: closing removes the position rather than zeroing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: i64,
    pub avg_entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.avg_entry_price)
    }

    /// Fractional loss relative to entry; positive when under water.
    pub fn loss_pct(&self, price: f64) -> f64 {
        (self.avg_entry_price - price) / self.avg_entry_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

/// One executed trade, as handed to the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: f64,
    /// Entry price of the closed position; sells only.
    pub entry_price: Option<f64>,
    /// Realized profit and loss; sells only.
    pub pnl: Option<f64>,
    pub reason: String,
    pub signal_strength: Option<f64>,
}
