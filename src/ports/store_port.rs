//! Position store port.

use crate::domain::error::EodtraderError;
use crate::domain::position::Position;

pub trait PositionStorePort {
    fn current_positions(&self) -> Result<Vec<Position>, EodtraderError>;

    fn open_position(&self, position: &Position) -> Result<(), EodtraderError>;

    /// Remove the position entirely; the store never keeps zero-quantity rows.
    fn close_position(&self, symbol: &str) -> Result<(), EodtraderError>;
}
