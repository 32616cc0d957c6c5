//! CSV file market-data adapter.
//!
//! Universe file: CSV with a `symbol` (or `Symbol`) column, order preserved.
//! Price files: `<SYMBOL>.csv` under the prices directory with `date,close`
//! rows. Symbols without a price file are silently absent from history, so a
//! partial data directory yields a partial (not failed) run.

use crate::domain::error::EodtraderError;
use crate::domain::price_series::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct CsvMarketDataAdapter {
    prices_dir: PathBuf,
    universe_path: PathBuf,
}

impl CsvMarketDataAdapter {
    pub fn new(prices_dir: PathBuf, universe_path: PathBuf) -> Self {
        Self {
            prices_dir,
            universe_path,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EodtraderError> {
        let prices_dir =
            config
                .get_string("data", "prices_dir")
                .ok_or_else(|| EodtraderError::ConfigMissing {
                    section: "data".into(),
                    key: "prices_dir".into(),
                })?;
        let universe_path =
            config
                .get_string("data", "universe_file")
                .ok_or_else(|| EodtraderError::ConfigMissing {
                    section: "data".into(),
                    key: "universe_file".into(),
                })?;
        Ok(Self::new(
            PathBuf::from(prices_dir),
            PathBuf::from(universe_path),
        ))
    }

    fn price_path(&self, symbol: &str) -> PathBuf {
        self.prices_dir.join(format!("{}.csv", symbol))
    }

    fn read_price_file(path: &Path) -> Result<Vec<(NaiveDate, f64)>, EodtraderError> {
        let mut rdr = csv::Reader::from_path(path).map_err(|e| EodtraderError::MarketData {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| EodtraderError::MarketData {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| EodtraderError::MarketData {
                reason: format!("missing date column in {}", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                EodtraderError::MarketData {
                    reason: format!("invalid date in {}: {}", path.display(), e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| EodtraderError::MarketData {
                    reason: format!("missing close column in {}", path.display()),
                })?
                .parse()
                .map_err(|e| EodtraderError::MarketData {
                    reason: format!("invalid close in {}: {}", path.display(), e),
                })?;

            points.push((date, close));
        }

        Ok(points)
    }
}

/// Normalize a raw universe token: trim, uppercase, dots to dashes.
fn clean_symbol(raw: &str) -> String {
    raw.trim().to_uppercase().replace('.', "-")
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn price_history(
        &self,
        symbols: &[String],
        as_of: NaiveDate,
        lookback_days: u32,
    ) -> Result<HashMap<String, PriceSeries>, EodtraderError> {
        let start = as_of - chrono::Days::new(lookback_days as u64);
        let mut history = HashMap::new();

        for symbol in symbols {
            let path = self.price_path(symbol);
            if !path.exists() {
                log::debug!("no price file for {}", symbol);
                continue;
            }
            let points = Self::read_price_file(&path)?;
            let in_range: Vec<(NaiveDate, f64)> = points
                .into_iter()
                .filter(|(date, _)| *date >= start && *date <= as_of)
                .collect();
            if in_range.is_empty() {
                continue;
            }
            history.insert(symbol.clone(), PriceSeries::from_points(symbol, in_range));
        }

        log::info!(
            "loaded price history for {} of {} symbols",
            history.len(),
            symbols.len()
        );
        Ok(history)
    }

    fn current_price(&self, symbol: &str) -> Result<Option<f64>, EodtraderError> {
        let path = self.price_path(symbol);
        if !path.exists() {
            return Ok(None);
        }
        let points = Self::read_price_file(&path)?;
        let series = PriceSeries::from_points(symbol, points);
        Ok(series.last_close())
    }

    fn is_market_open(&self) -> bool {
        // Weekday 09:30-16:00 heuristic; holiday calendars are the
        // scheduler's problem, and allow_after_hours overrides this anyway.
        let now = chrono::Local::now();
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let hm = (now.hour(), now.minute());
        hm >= (9, 30) && hm <= (16, 0)
    }

    fn tradable_universe(&self) -> Result<Vec<String>, EodtraderError> {
        let mut rdr = csv::Reader::from_path(&self.universe_path).map_err(|e| {
            EodtraderError::MarketData {
                reason: format!(
                    "failed to open universe file {}: {}",
                    self.universe_path.display(),
                    e
                ),
            }
        })?;

        let headers = rdr.headers().map_err(|e| EodtraderError::MarketData {
            reason: format!("universe file has no header: {}", e),
        })?;
        let symbol_col = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| EodtraderError::MarketData {
                reason: "universe file missing 'symbol' column".into(),
            })?;

        let mut symbols = Vec::new();
        let mut seen = HashSet::new();
        for result in rdr.records() {
            let record = result.map_err(|e| EodtraderError::MarketData {
                reason: format!("universe parse error: {}", e),
            })?;
            let Some(raw) = record.get(symbol_col) else {
                continue;
            };
            let symbol = clean_symbol(raw);
            if symbol.is_empty() || seen.contains(&symbol) {
                continue;
            }
            seen.insert(symbol.clone());
            symbols.push(symbol);
        }

        log::info!(
            "loaded {} symbols from {}",
            symbols.len(),
            self.universe_path.display()
        );
        Ok(symbols)
    }
}
