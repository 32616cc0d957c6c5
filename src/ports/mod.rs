//! Capability traits consumed by the decision engine.

pub mod market_data_port;
pub mod brokerage_port;
pub mod store_port;
pub mod recorder_port;
pub mod config_port;
