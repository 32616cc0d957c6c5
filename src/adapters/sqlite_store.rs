//! SQLite position store and run/signal recorder.

use crate::domain::engine::{RunOutcome, RunStatus};
use crate::domain::error::EodtraderError;
use crate::domain::position::{Position, TradeRecord, TradeSide};
use crate::domain::signal::{ActionTaken, Signal, SignalDetail};
use crate::ports::config_port::ConfigPort;
use crate::ports::recorder_port::RunRecorderPort;
use crate::ports::store_port::PositionStorePort;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const DATE_FMT: &str = "%Y-%m-%d";

pub struct SqliteStoreAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStoreAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EodtraderError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| EodtraderError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| EodtraderError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, EodtraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| EodtraderError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), EodtraderError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS positions (
                symbol TEXT PRIMARY KEY,
                quantity INTEGER NOT NULL,
                avg_entry_price REAL NOT NULL,
                entry_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trade_date TEXT NOT NULL,
                symbol TEXT NOT NULL,
                action TEXT NOT NULL CHECK (action IN ('BUY', 'SELL')),
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                entry_price REAL,
                pnl REAL,
                reason TEXT,
                signal_strength REAL
            );
            CREATE TABLE IF NOT EXISTS daily_signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                signal_date TEXT NOT NULL,
                symbol TEXT NOT NULL,
                signal_type TEXT NOT NULL,
                signal_strength REAL NOT NULL,
                momentum_rank INTEGER,
                momentum_value REAL,
                macd_value REAL,
                rsi_value REAL,
                macd_bullish INTEGER,
                rsi_bullish INTEGER,
                reason TEXT,
                action_taken TEXT,
                error_message TEXT
            );
            CREATE TABLE IF NOT EXISTS algorithm_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_date TEXT NOT NULL,
                status TEXT NOT NULL,
                signals_generated INTEGER NOT NULL DEFAULT 0,
                trades_executed INTEGER NOT NULL DEFAULT 0,
                error_message TEXT,
                execution_time_seconds INTEGER,
                top_momentum_stocks TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_trades_date ON trades(trade_date);
            CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol);
            CREATE INDEX IF NOT EXISTS idx_signals_date ON daily_signals(signal_date);
            CREATE INDEX IF NOT EXISTS idx_runs_date ON algorithm_runs(run_date);",
        )
        .map_err(query_err)?;

        Ok(())
    }

    /// Most recent trades, newest first.
    pub fn recent_trades(&self, limit: usize) -> Result<Vec<TradeRecord>, EodtraderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT trade_date, symbol, action, quantity, price,
                        entry_price, pnl, reason, signal_strength
                 FROM trades ORDER BY id DESC LIMIT ?1",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let date_str: String = row.get(0)?;
                let action: String = row.get(2)?;
                Ok(TradeRecord {
                    date: parse_date(&date_str)?,
                    symbol: row.get(1)?,
                    side: if action == "SELL" {
                        TradeSide::Sell
                    } else {
                        TradeSide::Buy
                    },
                    quantity: row.get(3)?,
                    price: row.get(4)?,
                    entry_price: row.get(5)?,
                    pnl: row.get(6)?,
                    reason: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                    signal_strength: row.get(8)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    /// Most recent run outcomes, newest first.
    pub fn recent_runs(&self, limit: usize) -> Result<Vec<RunOutcome>, EodtraderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT run_date, status, signals_generated, trades_executed,
                        error_message, execution_time_seconds, top_momentum_stocks
                 FROM algorithm_runs ORDER BY id DESC LIMIT ?1",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let date_str: String = row.get(0)?;
                let status: String = row.get(1)?;
                let top: Option<String> = row.get(6)?;
                Ok(RunOutcome {
                    date: parse_date(&date_str)?,
                    status: match status.as_str() {
                        "success" => RunStatus::Success,
                        "market_closed" => RunStatus::MarketClosed,
                        _ => RunStatus::Error,
                    },
                    signals_generated: row.get::<_, i64>(2)? as usize,
                    trades_executed: row.get::<_, i64>(3)? as usize,
                    error_message: row.get(4)?,
                    duration_seconds: row.get::<_, Option<i64>>(5)?.unwrap_or(0) as u64,
                    top_symbols: top
                        .filter(|s| !s.is_empty())
                        .map(|s| s.split(',').map(str::to_string).collect())
                        .unwrap_or_default(),
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, EodtraderError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| EodtraderError::Database {
                reason: e.to_string(),
            })
    }
}

impl PositionStorePort for SqliteStoreAdapter {
    fn current_positions(&self) -> Result<Vec<Position>, EodtraderError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, quantity, avg_entry_price, entry_date
                 FROM positions ORDER BY symbol ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                let date_str: String = row.get(3)?;
                Ok(Position {
                    symbol: row.get(0)?,
                    quantity: row.get(1)?,
                    avg_entry_price: row.get(2)?,
                    entry_date: parse_date(&date_str)?,
                })
            })
            .map_err(query_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_err)
    }

    fn open_position(&self, position: &Position) -> Result<(), EodtraderError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO positions (symbol, quantity, avg_entry_price, entry_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                position.symbol,
                position.quantity,
                position.avg_entry_price,
                position.entry_date.format(DATE_FMT).to_string()
            ],
        )
        .map_err(query_err)?;
        Ok(())
    }

    fn close_position(&self, symbol: &str) -> Result<(), EodtraderError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM positions WHERE symbol = ?1", params![symbol])
            .map_err(query_err)?;
        Ok(())
    }
}

impl RunRecorderPort for SqliteStoreAdapter {
    fn record_signals(&self, signals: &[Signal]) -> Result<(), EodtraderError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for signal in signals {
            let (momentum_rank, momentum_value, macd_value, rsi_value, macd_bullish, rsi_bullish) =
                match &signal.detail {
                    SignalDetail::Buy {
                        momentum_rank,
                        momentum_score,
                        macd_value,
                        rsi_value,
                        macd_bullish,
                        rsi_bullish,
                    } => (
                        Some(*momentum_rank as i64),
                        Some(*momentum_score),
                        Some(*macd_value),
                        Some(*rsi_value),
                        Some(*macd_bullish),
                        Some(*rsi_bullish),
                    ),
                    SignalDetail::Sell { .. } => (None, None, None, None, None, None),
                };

            let error_message = match &signal.action_taken {
                Some(ActionTaken::OrderFailed(message)) => Some(message.clone()),
                _ => None,
            };

            tx.execute(
                "INSERT INTO daily_signals
                 (signal_date, symbol, signal_type, signal_strength, momentum_rank,
                  momentum_value, macd_value, rsi_value, macd_bullish, rsi_bullish,
                  reason, action_taken, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    signal.date.format(DATE_FMT).to_string(),
                    signal.symbol,
                    signal.kind().as_str(),
                    signal.strength,
                    momentum_rank,
                    momentum_value,
                    macd_value,
                    rsi_value,
                    macd_bullish,
                    rsi_bullish,
                    signal.reason(),
                    signal.action_taken.as_ref().map(|a| a.as_str()),
                    error_message
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(())
    }

    fn record_trade(&self, trade: &TradeRecord) -> Result<(), EodtraderError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO trades
             (trade_date, symbol, action, quantity, price, entry_price, pnl, reason,
              signal_strength)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                trade.date.format(DATE_FMT).to_string(),
                trade.symbol,
                trade.side.as_str(),
                trade.quantity,
                trade.price,
                trade.entry_price,
                trade.pnl,
                trade.reason,
                trade.signal_strength
            ],
        )
        .map_err(query_err)?;
        Ok(())
    }

    fn record_run(&self, outcome: &RunOutcome) -> Result<(), EodtraderError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO algorithm_runs
             (run_date, status, signals_generated, trades_executed, error_message,
              execution_time_seconds, top_momentum_stocks)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                outcome.date.format(DATE_FMT).to_string(),
                outcome.status.as_str(),
                outcome.signals_generated as i64,
                outcome.trades_executed as i64,
                outcome.error_message,
                outcome.duration_seconds as i64,
                outcome.top_symbols.join(",")
            ],
        )
        .map_err(query_err)?;
        Ok(())
    }
}

fn query_err(e: rusqlite::Error) -> EodtraderError {
    EodtraderError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            s.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}
