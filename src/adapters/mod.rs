//! Concrete implementations of the port traits.

pub mod file_config_adapter;
pub mod csv_market_data;
pub mod paper_broker;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
