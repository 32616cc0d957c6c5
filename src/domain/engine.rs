//! Daily trading cycle: signal generation, position review, and order
//! execution against the brokerage.
//!
//! One cycle runs the full buy pipeline and the full sell pipeline, then
//! executes sells before buys so freed capital can fund the buys. Sizing uses
//! an account snapshot read once per run, before any sell proceeds post, so
//! the equal-weight allocation is computed against slightly stale equity.
//! Every signal ends the run with exactly one terminal tag; nothing retries.

use chrono::NaiveDate;
use std::time::Instant;

use crate::domain::config::AlgoConfig;
use crate::domain::error::EodtraderError;
use crate::domain::momentum::{MomentumRanking, TOP_MOMENTUM};
use crate::domain::position::{Position, TradeRecord, TradeSide};
use crate::domain::review::review_positions;
use crate::domain::signal::{ActionTaken, Signal, SignalDetail};
use crate::domain::signal_gen::generate_buy_signals;
use crate::ports::brokerage_port::{BrokeragePort, OrderAck, OrderRequest};
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::recorder_port::RunRecorderPort;
use crate::ports::store_port::PositionStorePort;

/// Extended-hours limit buffer: 0.5% of price or 50 cents, whichever moves
/// the limit further from the current price.
pub const LIMIT_BUFFER_PCT: f64 = 0.005;
pub const LIMIT_BUFFER_MIN: f64 = 0.50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    MarketClosed,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::MarketClosed => "market_closed",
            RunStatus::Error => "error",
        }
    }
}

/// What the caller of [`TradingEngine::run_daily_cycle`] gets back.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub status: RunStatus,
    pub signals_generated: usize,
    pub trades_executed: usize,
    pub duration_seconds: u64,
    pub error: Option<String>,
}

/// What the recorder persists about a completed (or failed) run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub date: NaiveDate,
    pub status: RunStatus,
    pub signals_generated: usize,
    pub trades_executed: usize,
    pub error_message: Option<String>,
    pub duration_seconds: u64,
    pub top_symbols: Vec<String>,
}

#[derive(Debug, Default)]
struct CycleCounters {
    signals_generated: usize,
    trades_executed: usize,
    top_symbols: Vec<String>,
}

pub struct TradingEngine<'a> {
    market_data: &'a dyn MarketDataPort,
    brokerage: &'a dyn BrokeragePort,
    store: &'a dyn PositionStorePort,
    recorder: &'a dyn RunRecorderPort,
    config: AlgoConfig,
}

impl<'a> TradingEngine<'a> {
    pub fn new(
        market_data: &'a dyn MarketDataPort,
        brokerage: &'a dyn BrokeragePort,
        store: &'a dyn PositionStorePort,
        recorder: &'a dyn RunRecorderPort,
        config: AlgoConfig,
    ) -> Self {
        TradingEngine {
            market_data,
            brokerage,
            store,
            recorder,
            config,
        }
    }

    /// Run one daily cycle. Internal failures are caught here: the run is
    /// recorded with partial counts and an error status, and the caller gets
    /// a `RunResult` rather than an `Err`.
    pub fn run_daily_cycle(&self, as_of: NaiveDate) -> RunResult {
        let started = Instant::now();
        log::info!("starting daily cycle for {}", as_of);

        if !self.market_data.is_market_open() && !self.config.allow_after_hours {
            log::info!("market is closed, skipping run");
            return RunResult {
                status: RunStatus::MarketClosed,
                signals_generated: 0,
                trades_executed: 0,
                duration_seconds: started.elapsed().as_secs(),
                error: None,
            };
        }

        let mut counters = CycleCounters::default();
        let cycle = self.run_cycle(as_of, &mut counters);
        let duration_seconds = started.elapsed().as_secs();

        let (status, error) = match cycle {
            Ok(()) => {
                log::info!(
                    "daily cycle completed in {}s: {} signals, {} trades",
                    duration_seconds,
                    counters.signals_generated,
                    counters.trades_executed
                );
                (RunStatus::Success, None)
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("daily cycle failed: {}", message);
                (RunStatus::Error, Some(message))
            }
        };

        let outcome = RunOutcome {
            date: as_of,
            status,
            signals_generated: counters.signals_generated,
            trades_executed: counters.trades_executed,
            error_message: error.clone(),
            duration_seconds,
            top_symbols: counters.top_symbols.clone(),
        };
        if let Err(e) = self.recorder.record_run(&outcome) {
            log::error!("failed to record run outcome: {}", e);
        }

        RunResult {
            status,
            signals_generated: counters.signals_generated,
            trades_executed: counters.trades_executed,
            duration_seconds,
            error,
        }
    }

    fn run_cycle(
        &self,
        as_of: NaiveDate,
        counters: &mut CycleCounters,
    ) -> Result<(), EodtraderError> {
        let universe = self.market_data.tradable_universe()?;
        log::info!("analyzing {} symbols", universe.len());

        let history =
            self.market_data
                .price_history(&universe, as_of, self.config.lookback_days)?;
        let ranking = MomentumRanking::rank(&universe, &history);
        log::info!("ranked {} of {} symbols", ranking.len(), universe.len());

        let mut buy_signals = generate_buy_signals(as_of, &ranking, &history, &self.config);
        counters.top_symbols = buy_signals
            .iter()
            .take(TOP_MOMENTUM)
            .map(|s| s.symbol.clone())
            .collect();

        let positions = self.store.current_positions()?;
        let mut sell_signals = review_positions(
            as_of,
            &positions,
            &ranking,
            self.market_data,
            self.config.stop_loss_threshold,
        );
        log::info!(
            "{} buy signals, {} sell signals",
            buy_signals.len(),
            sell_signals.len()
        );
        counters.signals_generated = buy_signals.len() + sell_signals.len();

        if self.config.trading_enabled {
            // One snapshot for the whole run; sells below do not refresh it.
            let account = self.brokerage.account_snapshot()?;
            log::info!("account value {:.2}", account.total_value);

            for signal in &mut sell_signals {
                let tag = self.execute_sell(signal);
                if tag.is_trade() {
                    counters.trades_executed += 1;
                }
                signal.action_taken = Some(tag);
            }
            for signal in &mut buy_signals {
                let tag = self.execute_buy(signal, account.total_value);
                if tag.is_trade() {
                    counters.trades_executed += 1;
                }
                signal.action_taken = Some(tag);
            }
        } else {
            log::info!("trading disabled - signals recorded, no orders sent");
            for signal in buy_signals.iter_mut().chain(sell_signals.iter_mut()) {
                signal.action_taken = Some(ActionTaken::TradingDisabled);
            }
        }

        let mut all_signals = buy_signals;
        all_signals.append(&mut sell_signals);
        if !all_signals.is_empty() {
            self.recorder.record_signals(&all_signals)?;
        }

        Ok(())
    }

    fn execute_sell(&self, signal: &Signal) -> ActionTaken {
        match self.try_execute_sell(signal) {
            Ok(tag) => tag,
            Err(e) => {
                log::error!("error executing sell for {}: {}", signal.symbol, e);
                ActionTaken::Error
            }
        }
    }

    fn try_execute_sell(&self, signal: &Signal) -> Result<ActionTaken, EodtraderError> {
        let SignalDetail::Sell {
            current_price,
            entry_price,
            quantity,
            ..
        } = signal.detail
        else {
            log::error!("sell execution given a non-sell signal for {}", signal.symbol);
            return Ok(ActionTaken::Error);
        };

        // Full-quantity close, always.
        let order = if self.brokerage.extended_hours() {
            let limit = round_cents(
                (current_price * (1.0 - LIMIT_BUFFER_PCT)).min(current_price - LIMIT_BUFFER_MIN),
            );
            OrderRequest::limit(&signal.symbol, quantity, TradeSide::Sell, limit)
        } else {
            OrderRequest::market(&signal.symbol, quantity, TradeSide::Sell)
        };

        match self.brokerage.submit_order(&order)? {
            OrderAck::Rejected { message } => {
                log::error!("failed to sell {}: {}", signal.symbol, message);
                Ok(ActionTaken::OrderFailed(message))
            }
            OrderAck::Accepted { .. } => {
                let pnl = (current_price - entry_price) * quantity as f64;
                self.recorder.record_trade(&TradeRecord {
                    date: signal.date,
                    symbol: signal.symbol.clone(),
                    side: TradeSide::Sell,
                    quantity,
                    price: current_price,
                    entry_price: Some(entry_price),
                    pnl: Some(pnl),
                    reason: signal.reason().to_string(),
                    signal_strength: None,
                })?;
                self.store.close_position(&signal.symbol)?;
                log::info!(
                    "sold {} shares of {} @ {:.2} (P&L {:.2})",
                    quantity,
                    signal.symbol,
                    current_price,
                    pnl
                );
                Ok(ActionTaken::Sold)
            }
        }
    }

    fn execute_buy(&self, signal: &Signal, account_value: f64) -> ActionTaken {
        match self.try_execute_buy(signal, account_value) {
            Ok(tag) => tag,
            Err(e) => {
                log::error!("error executing buy for {}: {}", signal.symbol, e);
                ActionTaken::Error
            }
        }
    }

    fn try_execute_buy(
        &self,
        signal: &Signal,
        account_value: f64,
    ) -> Result<ActionTaken, EodtraderError> {
        // Fresh snapshot per decision: a fill earlier in this run must make
        // a second buy of the same symbol bounce off already_owned.
        let positions = self.store.current_positions()?;
        if positions.iter().any(|p| p.symbol == signal.symbol) {
            log::info!("already own {}, skipping buy", signal.symbol);
            return Ok(ActionTaken::AlreadyOwned);
        }
        if positions.len() >= self.config.max_positions {
            log::info!(
                "max positions reached ({}), skipping {}",
                self.config.max_positions,
                signal.symbol
            );
            return Ok(ActionTaken::MaxPositions);
        }

        // Equal weight against the configured cap, not against free slots.
        let target_value = account_value / self.config.max_positions as f64;

        let Some(price) = self.market_data.current_price(&signal.symbol)? else {
            log::warn!("no current price for {}, skipping buy", signal.symbol);
            return Ok(ActionTaken::NoPrice);
        };

        let quantity = (target_value / price).floor() as i64;
        if quantity <= 0 {
            return Ok(ActionTaken::InsufficientFunds);
        }

        let order = if self.brokerage.extended_hours() {
            let limit =
                round_cents((price * (1.0 + LIMIT_BUFFER_PCT)).max(price + LIMIT_BUFFER_MIN));
            OrderRequest::limit(&signal.symbol, quantity, TradeSide::Buy, limit)
        } else {
            OrderRequest::market(&signal.symbol, quantity, TradeSide::Buy)
        };

        match self.brokerage.submit_order(&order)? {
            OrderAck::Rejected { message } => {
                log::error!("failed to buy {}: {}", signal.symbol, message);
                Ok(ActionTaken::OrderFailed(message))
            }
            OrderAck::Accepted { .. } => {
                self.recorder.record_trade(&TradeRecord {
                    date: signal.date,
                    symbol: signal.symbol.clone(),
                    side: TradeSide::Buy,
                    quantity,
                    price,
                    entry_price: None,
                    pnl: None,
                    reason: signal.reason().to_string(),
                    signal_strength: Some(signal.strength),
                })?;
                self.store.open_position(&Position {
                    symbol: signal.symbol.clone(),
                    quantity,
                    avg_entry_price: price,
                    entry_date: signal.date,
                })?;
                log::info!(
                    "bought {} shares of {} @ {:.2}",
                    quantity,
                    signal.symbol,
                    price
                );
                Ok(ActionTaken::Bought)
            }
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
