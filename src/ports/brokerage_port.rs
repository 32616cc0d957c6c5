//! Brokerage access port.

use crate::domain::error::EodtraderError;
use crate::domain::position::TradeSide;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub total_value: f64,
    pub buying_power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    /// DAY limit order; required for extended-hours submission.
    Limit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub quantity: i64,
    pub side: TradeSide,
    pub order_type: OrderType,
    pub limit_price: Option<f64>,
}

impl OrderRequest {
    pub fn market(symbol: &str, quantity: i64, side: TradeSide) -> Self {
        OrderRequest {
            symbol: symbol.to_string(),
            quantity,
            side,
            order_type: OrderType::Market,
            limit_price: None,
        }
    }

    pub fn limit(symbol: &str, quantity: i64, side: TradeSide, limit_price: f64) -> Self {
        OrderRequest {
            symbol: symbol.to_string(),
            quantity,
            side,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
        }
    }
}

/// Brokerage response to a submission. A rejection is a normal outcome, not
/// an `Err`; transport failures surface as `EodtraderError`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAck {
    Accepted { fill_price: Option<f64> },
    Rejected { message: String },
}

pub trait BrokeragePort {
    fn account_snapshot(&self) -> Result<AccountSnapshot, EodtraderError>;

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, EodtraderError>;

    /// Whether this adapter is configured for extended-hours sessions; the
    /// engine queries this, it never sets it.
    fn extended_hours(&self) -> bool;
}
