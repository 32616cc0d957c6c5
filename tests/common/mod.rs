#![allow(dead_code)]

use chrono::NaiveDate;
use eodtrader::domain::momentum::MOMENTUM_WINDOW;
use std::fs;
use std::path::Path;

pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Write `<symbol>.csv` with one close per consecutive calendar day, the
/// last row landing on `end`.
pub fn write_price_csv(prices_dir: &Path, symbol: &str, closes: &[f64], end: NaiveDate) {
    let mut content = String::from("date,close\n");
    let start = end - chrono::Days::new(closes.len() as u64 - 1);
    for (i, close) in closes.iter().enumerate() {
        let day = start + chrono::Days::new(i as u64);
        content.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), close));
    }
    fs::write(prices_dir.join(format!("{}.csv", symbol)), content).unwrap();
}

pub fn write_universe(path: &Path, symbols: &[&str]) {
    let mut content = String::from("symbol\n");
    for symbol in symbols {
        content.push_str(symbol);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

/// Flat for a year, one sharp gain on the final day: ranks on momentum and
/// passes both strict indicator filters.
pub fn breakout_closes() -> Vec<f64> {
    let mut closes = vec![100.0; MOMENTUM_WINDOW + 10];
    closes.push(110.0);
    closes
}

/// A year flat at 100, then a drop to 80 over the last two days.
pub fn stop_loss_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 250];
    closes.extend([80.0, 80.0]);
    closes
}

pub fn flat_closes(n: usize) -> Vec<f64> {
    vec![100.0; n]
}
