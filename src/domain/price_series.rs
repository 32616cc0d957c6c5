//! Close-price series per symbol.
//!
//! Dates ascend with no duplicates; the constructor normalizes whatever the
//! data provider hands back. Stored as parallel vectors so indicator kernels
//! can borrow the closes as a plain slice.

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from (date, close) pairs. Input is sorted by date and
    /// de-duplicated, first occurrence of a date wins.
    pub fn from_points(symbol: &str, mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        let mut dates = Vec::with_capacity(points.len());
        let mut closes = Vec::with_capacity(points.len());
        for (date, close) in points {
            if dates.last() == Some(&date) {
                continue;
            }
            dates.push(date);
            closes.push(close);
        }
        Self {
            symbol: symbol.to_string(),
            dates,
            closes,
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
