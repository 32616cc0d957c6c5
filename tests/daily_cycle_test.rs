//! End-to-end daily cycle tests: CSV market data, paper brokerage, and the
//! SQLite store wired through the real engine.

#![cfg(feature = "sqlite")]

mod common;

use approx::assert_relative_eq;
use common::*;
use eodtrader::adapters::csv_market_data::CsvMarketDataAdapter;
use eodtrader::adapters::paper_broker::PaperBrokerAdapter;
use eodtrader::adapters::sqlite_store::SqliteStoreAdapter;
use eodtrader::domain::config::AlgoConfig;
use eodtrader::domain::engine::{RunStatus, TradingEngine};
use eodtrader::domain::position::{Position, TradeSide};
use eodtrader::ports::store_port::PositionStorePort;
use std::fs;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    market: CsvMarketDataAdapter,
    store: SqliteStoreAdapter,
}

fn fixture(symbols: &[(&str, Vec<f64>)]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let prices = dir.path().join("prices");
    fs::create_dir(&prices).unwrap();

    for (symbol, closes) in symbols {
        write_price_csv(&prices, symbol, closes, as_of());
    }

    let universe_path = dir.path().join("universe.csv");
    let names: Vec<&str> = symbols.iter().map(|(s, _)| *s).collect();
    write_universe(&universe_path, &names);

    let market = CsvMarketDataAdapter::new(prices, universe_path);
    let store = SqliteStoreAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();

    Fixture {
        _dir: dir,
        market,
        store,
    }
}

fn live_config() -> AlgoConfig {
    AlgoConfig {
        trading_enabled: true,
        allow_after_hours: true,
        ..AlgoConfig::default()
    }
}

#[test]
fn full_cycle_buys_breakout_candidate() {
    let fx = fixture(&[("POP", breakout_closes())]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);

    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.signals_generated, 1);
    assert_eq!(result.trades_executed, 1);

    // 50_000 / 15 = 3333.33 target at 110 → 30 shares.
    let positions = fx.store.current_positions().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].symbol, "POP");
    assert_eq!(positions[0].quantity, 30);
    assert_eq!(positions[0].entry_date, as_of());

    let trades = fx.store.recent_trades(10).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].side, TradeSide::Buy);
    assert_eq!(trades[0].symbol, "POP");
    assert_eq!(trades[0].price, 110.0);

    let runs = fx.store.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Success);
    assert_eq!(runs[0].top_symbols, vec!["POP"]);
}

#[test]
fn stop_loss_closes_underwater_position() {
    // Twelve months flat at 100, then a drop to 80: a 20% loss against the
    // 7% threshold.
    let fx = fixture(&[("HOLD", stop_loss_closes())]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);

    fx.store
        .open_position(&Position {
            symbol: "HOLD".into(),
            quantity: 10,
            avg_entry_price: 100.0,
            entry_date: date(2024, 1, 2),
        })
        .unwrap();

    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.trades_executed, 1);
    assert!(fx.store.current_positions().unwrap().is_empty());

    let trades = fx.store.recent_trades(10).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].side, TradeSide::Sell);
    assert_eq!(trades[0].reason, "stop_loss");
    assert_eq!(trades[0].entry_price, Some(100.0));
    // (80 − 100) × 10
    assert_relative_eq!(trades[0].pnl.unwrap(), -200.0);
}

#[test]
fn momentum_exit_sells_position_outside_top_30() {
    // The held symbol is absent from the universe entirely, so it reviews
    // as unranked while staying above its stop.
    let fx = fixture(&[("POP", breakout_closes())]);
    let prices_dir = fx._dir.path().join("prices");
    write_price_csv(&prices_dir, "OLDWIN", &flat_closes(300), as_of());

    let broker = PaperBrokerAdapter::new(50_000.0, false);
    fx.store
        .open_position(&Position {
            symbol: "OLDWIN".into(),
            quantity: 5,
            avg_entry_price: 99.0,
            entry_date: date(2024, 1, 2),
        })
        .unwrap();

    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    // One sell (momentum exit) and one buy (POP).
    assert_eq!(result.trades_executed, 2);

    let trades = fx.store.recent_trades(10).unwrap();
    let sell = trades.iter().find(|t| t.side == TradeSide::Sell).unwrap();
    assert_eq!(sell.symbol, "OLDWIN");
    assert_eq!(sell.reason, "momentum_exit");

    let positions = fx.store.current_positions().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].symbol, "POP");
}

#[test]
fn trading_disabled_still_records_signals() {
    let fx = fixture(&[("POP", breakout_closes())]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);

    let config = AlgoConfig {
        allow_after_hours: true,
        ..AlgoConfig::default()
    };
    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, config);
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.signals_generated, 1);
    assert_eq!(result.trades_executed, 0);
    assert!(fx.store.current_positions().unwrap().is_empty());
    assert!(fx.store.recent_trades(10).unwrap().is_empty());

    // The signal is persisted with its terminal tag for observability.
    let runs = fx.store.recent_runs(10).unwrap();
    assert_eq!(runs[0].signals_generated, 1);
}

#[test]
fn max_positions_rejects_new_buy() {
    let fx = fixture(&[("POP", breakout_closes())]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);

    for i in 0..15 {
        fx.store
            .open_position(&Position {
                symbol: format!("P{:02}", i),
                quantity: 1,
                avg_entry_price: 100.0,
                entry_date: date(2024, 1, 2),
            })
            .unwrap();
    }

    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.trades_executed, 0);
    // The held book is untouched and POP was not added.
    let positions = fx.store.current_positions().unwrap();
    assert_eq!(positions.len(), 15);
    assert!(positions.iter().all(|p| p.symbol != "POP"));
}

#[test]
fn insufficient_history_yields_empty_run() {
    // 60 observations: below the 252 momentum floor, so nothing ranks and
    // no signals are generated, but the run still succeeds.
    let fx = fixture(&[("NEW", flat_closes(60))]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);

    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());
    let result = engine.run_daily_cycle(as_of());

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.signals_generated, 0);
    assert_eq!(result.trades_executed, 0);
}

#[test]
fn rerunning_after_fill_is_already_owned() {
    let fx = fixture(&[("POP", breakout_closes())]);
    let broker = PaperBrokerAdapter::new(50_000.0, false);
    let engine = TradingEngine::new(&fx.market, &broker, &fx.store, &fx.store, live_config());

    let first = engine.run_daily_cycle(as_of());
    assert_eq!(first.trades_executed, 1);

    // Same data, same day: the signal regenerates but bounces off the
    // now-open position.
    let second = engine.run_daily_cycle(as_of());
    assert_eq!(second.status, RunStatus::Success);
    assert_eq!(second.signals_generated, 1);
    assert_eq!(second.trades_executed, 0);
    assert_eq!(fx.store.current_positions().unwrap().len(), 1);
}
