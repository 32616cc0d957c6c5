//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(fast) − EMA(slow)
//! Signal line = EMA(MACD line, signal span)
//! Histogram = MACD line − signal line
//!
//! Default spans: fast=12, slow=26, signal=9. Returns `None` when the series
//! has fewer than `slow + signal` observations.

use crate::domain::indicator::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Full-length MACD output, aligned index-for-index with the input series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Latest MACD-line value.
    pub fn last(&self) -> Option<f64> {
        self.line.last().copied()
    }

    /// MACD-line value one observation back.
    pub fn prev(&self) -> Option<f64> {
        let n = self.line.len();
        if n < 2 {
            None
        } else {
            Some(self.line[n - 2])
        }
    }
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Option<MacdSeries> {
    if fast == 0 || slow == 0 || signal_span == 0 {
        return None;
    }
    if closes.len() < slow + signal_span {
        return None;
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&line, signal_span);

    let histogram: Vec<f64> = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Some(MacdSeries {
        line,
        signal,
        histogram,
    })
}

pub fn macd_default(closes: &[f64]) -> Option<MacdSeries> {
    macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn too_short_returns_none() {
        // Threshold is slow + signal = 35 for defaults.
        assert!(macd_default(&ramp(34)).is_none());
        assert!(macd_default(&ramp(35)).is_some());
    }

    #[test]
    fn zero_spans_return_none() {
        let closes = ramp(40);
        assert!(macd(&closes, 0, 26, 9).is_none());
        assert!(macd(&closes, 12, 0, 9).is_none());
        assert!(macd(&closes, 12, 26, 0).is_none());
    }

    #[test]
    fn line_is_ema_fast_minus_ema_slow() {
        let closes = ramp(40);
        let series = macd(&closes, 3, 5, 2).unwrap();

        let ema_fast = ema(&closes, 3);
        let ema_slow = ema(&closes, 5);

        for i in 0..closes.len() {
            let expected = ema_fast[i] - ema_slow[i];
            assert!(
                (series.line[i] - expected).abs() < 1e-12,
                "MACD line mismatch at index {}",
                i
            );
        }
    }

    #[test]
    fn histogram_equals_line_minus_signal() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + ((i % 9) as f64) * 1.5).collect();
        let series = macd_default(&closes).unwrap();

        for i in 0..series.len() {
            let expected = series.line[i] - series.signal[i];
            assert!((series.histogram[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_prices_give_zero_macd() {
        let series = macd_default(&[100.0; 40]).unwrap();
        for v in &series.line {
            assert!(v.abs() < f64::EPSILON);
        }
        for v in &series.histogram {
            assert!(v.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let series = macd_default(&ramp(60)).unwrap();
        // A steady uptrend pulls the fast EMA above the slow EMA.
        assert!(series.last().unwrap() > 0.0);
    }

    #[test]
    fn last_and_prev() {
        let series = macd_default(&ramp(40)).unwrap();
        let n = series.len();
        assert_eq!(series.last(), Some(series.line[n - 1]));
        assert_eq!(series.prev(), Some(series.line[n - 2]));
    }

    #[test]
    fn output_aligned_with_input() {
        let closes = ramp(45);
        let series = macd_default(&closes).unwrap();
        assert_eq!(series.line.len(), 45);
        assert_eq!(series.signal.len(), 45);
        assert_eq!(series.histogram.len(), 45);
    }
}
