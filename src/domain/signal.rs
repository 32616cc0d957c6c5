//! Trading signals and their terminal outcomes.
//!
//! A signal is created by the generator (BUY) or the reviewer (SELL), tagged
//! exactly once by the execution coordinator, then handed to the recorder.
//! Every tag is terminal: a signal is never retried within a run.

use chrono::NaiveDate;

/// Sentinel rank for a held symbol that dropped out of the rankable universe.
pub const UNRANKED: usize = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SellReason {
    StopLoss { loss_pct: f64 },
    MomentumExit { rank: usize },
}

impl SellReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellReason::StopLoss { .. } => "stop_loss",
            SellReason::MomentumExit { .. } => "momentum_exit",
        }
    }
}

/// Kind-specific payload. Buys carry the scoring inputs for audit; sells
/// carry everything execution needs to close the position.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalDetail {
    Buy {
        momentum_rank: usize,
        momentum_score: f64,
        macd_value: f64,
        rsi_value: f64,
        macd_bullish: bool,
        rsi_bullish: bool,
    },
    Sell {
        reason: SellReason,
        current_price: f64,
        entry_price: f64,
        quantity: i64,
    },
}

/// Terminal outcome of one signal's trip through the execution coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionTaken {
    TradingDisabled,
    AlreadyOwned,
    MaxPositions,
    NoPrice,
    InsufficientFunds,
    /// Brokerage rejected the order; the adapter's message is kept verbatim.
    OrderFailed(String),
    Error,
    Bought,
    Sold,
}

impl ActionTaken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTaken::TradingDisabled => "trading_disabled",
            ActionTaken::AlreadyOwned => "already_owned",
            ActionTaken::MaxPositions => "max_positions",
            ActionTaken::NoPrice => "no_price",
            ActionTaken::InsufficientFunds => "insufficient_funds",
            ActionTaken::OrderFailed(_) => "order_failed",
            ActionTaken::Error => "error",
            ActionTaken::Bought => "bought",
            ActionTaken::Sold => "sold",
        }
    }

    /// True when an order actually filled.
    pub fn is_trade(&self) -> bool {
        matches!(self, ActionTaken::Bought | ActionTaken::Sold)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub symbol: String,
    /// Priority score: buys in [0, 1] by construction of the strength
    /// formula's weights, sells fixed at 1.0 (stop-loss) or 0.8.
    pub strength: f64,
    pub detail: SignalDetail,
    pub action_taken: Option<ActionTaken>,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self.detail {
            SignalDetail::Buy { .. } => SignalKind::Buy,
            SignalDetail::Sell { .. } => SignalKind::Sell,
        }
    }

    /// Reason string persisted with the signal and any resulting trade.
    pub fn reason(&self) -> &'static str {
        match &self.detail {
            SignalDetail::Buy { .. } => "algorithm",
            SignalDetail::Sell { reason, .. } => reason.as_str(),
        }
    }
}
