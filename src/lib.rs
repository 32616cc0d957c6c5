//! eodtrader — end-of-day momentum trading bot.
//!
//! Hexagonal architecture: decision engine in [`domain`], port traits in
//! [`ports`], concrete collaborators in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
