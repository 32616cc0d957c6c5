//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market_data::CsvMarketDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_broker::PaperBrokerAdapter;
use crate::domain::config::AlgoConfig;
use crate::domain::error::EodtraderError;

#[derive(Parser, Debug)]
#[command(name = "eodtrader", about = "End-of-day momentum trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daily trading cycle
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Run as of this date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List open positions
    Positions {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show recent run outcomes
    Runs {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Create the database schema
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config, date } => run_cycle(&config, date.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Positions { config } => run_positions(&config),
        Command::Runs { config, limit } => run_runs(&config, limit),
        Command::InitDb { config } => run_init_db(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EodtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn parse_run_date(date: Option<&str>) -> Result<NaiveDate, ExitCode> {
    match date {
        None => Ok(chrono::Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            eprintln!("error: invalid date '{s}', expected YYYY-MM-DD");
            ExitCode::from(2)
        }),
    }
}

fn run_cycle(config_path: &PathBuf, date: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let algo_config = match AlgoConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let as_of = match parse_run_date(date) {
        Ok(d) => d,
        Err(code) => return code,
    };

    let market_data = match CsvMarketDataAdapter::from_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let brokerage = match PaperBrokerAdapter::from_config(&adapter) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_store::SqliteStoreAdapter;
        use crate::domain::engine::{RunStatus, TradingEngine};

        let store = match SqliteStoreAdapter::from_config(&adapter) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = store.initialize_schema() {
            eprintln!("error: {e}");
            return (&e).into();
        }

        eprintln!("Running daily cycle for {as_of}...");
        let engine = TradingEngine::new(&market_data, &brokerage, &store, &store, algo_config);
        let result = engine.run_daily_cycle(as_of);

        eprintln!(
            "Run {}: {} signals, {} trades, {}s",
            result.status.as_str(),
            result.signals_generated,
            result.trades_executed,
            result.duration_seconds
        );
        match result.status {
            RunStatus::Success | RunStatus::MarketClosed => ExitCode::SUCCESS,
            RunStatus::Error => {
                if let Some(error) = result.error {
                    eprintln!("error: {error}");
                }
                ExitCode::FAILURE
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (market_data, brokerage, algo_config, as_of);
        eprintln!("error: built without the 'sqlite' feature, no position store available");
        ExitCode::from(2)
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = AlgoConfig::from_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = CsvMarketDataAdapter::from_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = PaperBrokerAdapter::from_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Configuration OK");
    ExitCode::SUCCESS
}

#[cfg(feature = "sqlite")]
fn open_store(
    config_path: &PathBuf,
) -> Result<crate::adapters::sqlite_store::SqliteStoreAdapter, ExitCode> {
    use crate::adapters::sqlite_store::SqliteStoreAdapter;

    let adapter = load_config(config_path)?;
    SqliteStoreAdapter::from_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

#[cfg(feature = "sqlite")]
fn run_positions(config_path: &PathBuf) -> ExitCode {
    use crate::ports::store_port::PositionStorePort;

    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.current_positions() {
        Ok(positions) if positions.is_empty() => {
            println!("No open positions");
            ExitCode::SUCCESS
        }
        Ok(positions) => {
            println!("{:<8} {:>8} {:>12} {:>12}", "SYMBOL", "QTY", "ENTRY", "DATE");
            for p in positions {
                println!(
                    "{:<8} {:>8} {:>12.2} {:>12}",
                    p.symbol, p.quantity, p.avg_entry_price, p.entry_date
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[cfg(feature = "sqlite")]
fn run_runs(config_path: &PathBuf, limit: usize) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.recent_runs(limit) {
        Ok(runs) if runs.is_empty() => {
            println!("No recorded runs");
            ExitCode::SUCCESS
        }
        Ok(runs) => {
            for run in runs {
                println!(
                    "{} {:<13} signals={} trades={} {}s{}",
                    run.date,
                    run.status.as_str(),
                    run.signals_generated,
                    run.trades_executed,
                    run.duration_seconds,
                    run.error_message
                        .map(|m| format!(" error: {m}"))
                        .unwrap_or_default()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[cfg(feature = "sqlite")]
fn run_init_db(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match store.initialize_schema() {
        Ok(()) => {
            eprintln!("Database schema initialized");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[cfg(not(feature = "sqlite"))]
fn run_positions(_config_path: &PathBuf) -> ExitCode {
    eprintln!("error: built without the 'sqlite' feature, no position store available");
    ExitCode::from(2)
}

#[cfg(not(feature = "sqlite"))]
fn run_runs(_config_path: &PathBuf, _limit: usize) -> ExitCode {
    eprintln!("error: built without the 'sqlite' feature, no position store available");
    ExitCode::from(2)
}

#[cfg(not(feature = "sqlite"))]
fn run_init_db(_config_path: &PathBuf) -> ExitCode {
    eprintln!("error: built without the 'sqlite' feature, no position store available");
    ExitCode::from(2)
}
