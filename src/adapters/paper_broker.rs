//! Paper brokerage adapter.
//!
//! Accepts every order and reports a fixed account value. The real account
//! lives at the brokerage; this adapter stands in for it during dry runs and
//! local testing, so it deliberately does not simulate cash flows.

use crate::domain::error::EodtraderError;
use crate::ports::brokerage_port::{AccountSnapshot, BrokeragePort, OrderAck, OrderRequest};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_ACCOUNT_VALUE: f64 = 50_000.0;

pub struct PaperBrokerAdapter {
    account_value: f64,
    extended_hours: bool,
}

impl PaperBrokerAdapter {
    pub fn new(account_value: f64, extended_hours: bool) -> Self {
        Self {
            account_value,
            extended_hours,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EodtraderError> {
        let account_value =
            config.get_double("brokerage", "account_value", DEFAULT_ACCOUNT_VALUE);
        if account_value <= 0.0 {
            return Err(EodtraderError::ConfigInvalid {
                section: "brokerage".into(),
                key: "account_value".into(),
                reason: "account_value must be positive".into(),
            });
        }
        let extended_hours = config.get_bool("brokerage", "extended_hours", false);
        Ok(Self::new(account_value, extended_hours))
    }
}

impl BrokeragePort for PaperBrokerAdapter {
    fn account_snapshot(&self) -> Result<AccountSnapshot, EodtraderError> {
        Ok(AccountSnapshot {
            total_value: self.account_value,
            buying_power: self.account_value,
        })
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, EodtraderError> {
        log::info!(
            "paper fill: {} {} x{} ({:?} limit {:?})",
            order.side.as_str(),
            order.symbol,
            order.quantity,
            order.order_type,
            order.limit_price
        );
        Ok(OrderAck::Accepted {
            fill_price: order.limit_price,
        })
    }

    fn extended_hours(&self) -> bool {
        self.extended_hours
    }
}
