//! Position review: stop-loss and momentum-exit sell signals.
//!
//! At most one SELL per held symbol. The stop-loss check short-circuits the
//! momentum check, so a position can never produce both in one run. Missing
//! prices are logged and skipped; a skipped position never fails the run.

use chrono::NaiveDate;

use crate::domain::momentum::{MomentumRanking, TOP_MOMENTUM};
use crate::domain::position::Position;
use crate::domain::signal::{SellReason, Signal, SignalDetail, UNRANKED};
use crate::ports::market_data_port::MarketDataPort;

pub const STOP_LOSS_PRIORITY: f64 = 1.0;
pub const MOMENTUM_EXIT_PRIORITY: f64 = 0.8;

/// Review all held positions against fresh prices and the run's momentum
/// ranking. Output is sorted by priority, stop-losses first.
pub fn review_positions(
    as_of: NaiveDate,
    positions: &[Position],
    ranking: &MomentumRanking,
    market_data: &dyn MarketDataPort,
    stop_loss_threshold: f64,
) -> Vec<Signal> {
    let mut signals: Vec<Signal> = Vec::new();

    for position in positions {
        let current_price = match market_data.current_price(&position.symbol) {
            Ok(Some(price)) => price,
            Ok(None) => {
                log::warn!("no current price for {}, skipping review", position.symbol);
                continue;
            }
            Err(e) => {
                log::warn!("price lookup failed for {}: {}", position.symbol, e);
                continue;
            }
        };

        let loss_pct = position.loss_pct(current_price);
        if loss_pct >= stop_loss_threshold {
            log::info!(
                "stop loss triggered for {}: {:.1}% loss",
                position.symbol,
                loss_pct * 100.0
            );
            signals.push(sell_signal(
                as_of,
                position,
                current_price,
                STOP_LOSS_PRIORITY,
                SellReason::StopLoss { loss_pct },
            ));
            continue;
        }

        if !ranking.is_top(&position.symbol, TOP_MOMENTUM) {
            let rank = ranking.rank_of(&position.symbol).unwrap_or(UNRANKED);
            log::info!(
                "momentum exit for {}: dropped to rank {}",
                position.symbol,
                rank
            );
            signals.push(sell_signal(
                as_of,
                position,
                current_price,
                MOMENTUM_EXIT_PRIORITY,
                SellReason::MomentumExit { rank },
            ));
        }
    }

    // Stable sort: stop-losses ahead of momentum exits, position order
    // within each priority.
    signals.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    signals
}

fn sell_signal(
    as_of: NaiveDate,
    position: &Position,
    current_price: f64,
    priority: f64,
    reason: SellReason,
) -> Signal {
    Signal {
        date: as_of,
        symbol: position.symbol.clone(),
        strength: priority,
        detail: SignalDetail::Sell {
            reason,
            current_price,
            entry_price: position.avg_entry_price,
            quantity: position.quantity,
        },
        action_taken: None,
    }
}
