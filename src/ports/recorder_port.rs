//! Run, signal, and trade recording port.

use crate::domain::engine::RunOutcome;
use crate::domain::error::EodtraderError;
use crate::domain::position::TradeRecord;
use crate::domain::signal::Signal;

pub trait RunRecorderPort {
    fn record_signals(&self, signals: &[Signal]) -> Result<(), EodtraderError>;

    fn record_trade(&self, trade: &TradeRecord) -> Result<(), EodtraderError>;

    fn record_run(&self, outcome: &RunOutcome) -> Result<(), EodtraderError>;
}
