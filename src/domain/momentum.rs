//! 12-1 momentum ranking.
//!
//! Score = 12-month return minus 1-month return, measured 252 and 21
//! observations back. Symbols with fewer than 252 observations are silently
//! excluded from the ranking. The order is total: descending by score, ties
//! broken by the symbol's position in the input universe.

use crate::domain::price_series::PriceSeries;
use std::collections::HashMap;

/// Observations required before a symbol can be ranked.
pub const MOMENTUM_WINDOW: usize = 252;
/// Short-term reversal window excluded from the score.
pub const REVERSAL_WINDOW: usize = 21;
/// Number of top-ranked symbols considered by the buy and sell pipelines.
pub const TOP_MOMENTUM: usize = 30;

#[derive(Debug, Clone)]
pub struct MomentumEntry {
    pub symbol: String,
    pub score: f64,
    /// 1-based rank, 1 = strongest momentum.
    pub rank: usize,
}

#[derive(Debug, Clone)]
pub struct MomentumRanking {
    entries: Vec<MomentumEntry>,
    by_symbol: HashMap<String, usize>,
}

impl MomentumRanking {
    /// Rank `universe` (in its given order, which fixes tie-breaks) using the
    /// price series available in `history`. Symbols without a series or with
    /// too little history simply do not appear in the result.
    pub fn rank(universe: &[String], history: &HashMap<String, PriceSeries>) -> Self {
        let mut scored: Vec<(String, f64)> = Vec::new();
        for symbol in universe {
            let Some(series) = history.get(symbol) else {
                continue;
            };
            match momentum_score(series.closes()) {
                Some(score) => scored.push((symbol.clone(), score)),
                None => {
                    log::debug!(
                        "excluding {} from ranking: {} of {} observations",
                        symbol,
                        series.len(),
                        MOMENTUM_WINDOW
                    );
                }
            }
        }

        // Stable sort keeps input order for equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let entries: Vec<MomentumEntry> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (symbol, score))| MomentumEntry {
                symbol,
                score,
                rank: i + 1,
            })
            .collect();

        let by_symbol = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.symbol.clone(), i))
            .collect();

        MomentumRanking { entries, by_symbol }
    }

    pub fn entries(&self) -> &[MomentumEntry] {
        &self.entries
    }

    /// The `n` strongest entries (all of them if fewer qualify).
    pub fn top(&self, n: usize) -> &[MomentumEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn rank_of(&self, symbol: &str) -> Option<usize> {
        self.by_symbol.get(symbol).map(|&i| self.entries[i].rank)
    }

    pub fn is_top(&self, symbol: &str, n: usize) -> bool {
        self.rank_of(symbol).is_some_and(|rank| rank <= n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 12-1 momentum score, or `None` with fewer than [`MOMENTUM_WINDOW`]
/// observations.
pub fn momentum_score(closes: &[f64]) -> Option<f64> {
    if closes.len() < MOMENTUM_WINDOW {
        return None;
    }

    let current = closes[closes.len() - 1];
    let price_12m = price_back(closes, MOMENTUM_WINDOW);
    let price_1m = price_back(closes, REVERSAL_WINDOW);

    let return_12m = (current - price_12m) / price_12m;
    let return_1m = (current - price_1m) / price_1m;

    Some(return_12m - return_1m)
}

/// Price `n` observations back, clamping to the oldest available price.
fn price_back(closes: &[f64], n: usize) -> f64 {
    if closes.len() >= n {
        closes[closes.len() - n]
    } else {
        closes[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (start + chrono::Days::new(i as u64), c))
            .collect();
        PriceSeries::from_points(symbol, points)
    }

    fn history(entries: &[(&str, Vec<f64>)]) -> HashMap<String, PriceSeries> {
        entries
            .iter()
            .map(|(s, closes)| (s.to_string(), series(s, closes)))
            .collect()
    }

    fn universe(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    /// Flat for a year, then a linear move over the last month to `end`.
    fn drift_to(end: f64) -> Vec<f64> {
        let mut closes = vec![100.0; MOMENTUM_WINDOW];
        for i in 0..REVERSAL_WINDOW {
            let t = (i + 1) as f64 / REVERSAL_WINDOW as f64;
            closes.push(100.0 + (end - 100.0) * t);
        }
        closes
    }

    #[test]
    fn score_none_below_window() {
        let closes = vec![100.0; MOMENTUM_WINDOW - 1];
        assert!(momentum_score(&closes).is_none());
    }

    #[test]
    fn score_flat_series_is_zero() {
        let score = momentum_score(&vec![100.0; MOMENTUM_WINDOW]).unwrap();
        assert!(score.abs() < f64::EPSILON);
    }

    /// Doubled 11 months ago, flat since: full 12-month return with no
    /// short-term reversal to subtract.
    fn gained_long_ago() -> Vec<f64> {
        let mut closes = vec![100.0];
        closes.extend(vec![200.0; MOMENTUM_WINDOW - 1]);
        closes
    }

    /// All of the doubling packed into the last month: the reversal term
    /// cancels most of the 12-month return.
    fn gained_last_month() -> Vec<f64> {
        let flat = MOMENTUM_WINDOW - REVERSAL_WINDOW;
        let mut closes = vec![100.0; flat];
        for i in 0..REVERSAL_WINDOW {
            let t = (i + 1) as f64 / REVERSAL_WINDOW as f64;
            closes.push(100.0 + 100.0 * t);
        }
        closes
    }

    #[test]
    fn score_rewards_old_gains_discounts_recent() {
        let old = momentum_score(&gained_long_ago()).unwrap();
        assert!((old - 1.0).abs() < 1e-9);

        let recent = momentum_score(&gained_last_month()).unwrap();
        assert!(recent < 0.2, "recent gain should be mostly cancelled: {}", recent);
        assert!(old > recent);
    }

    #[test]
    fn ranking_orders_by_score_descending() {
        let history = history(&[
            ("LATE", gained_last_month()),
            ("EARLY", gained_long_ago()),
            ("FLAT", vec![100.0; MOMENTUM_WINDOW]),
        ]);
        let ranking =
            MomentumRanking::rank(&universe(&["LATE", "EARLY", "FLAT"]), &history);

        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking.entries()[0].symbol, "EARLY");
        assert_eq!(ranking.entries()[0].rank, 1);
        assert_eq!(ranking.rank_of("LATE"), Some(2));
        assert_eq!(ranking.rank_of("FLAT"), Some(3));
    }

    #[test]
    fn short_series_silently_excluded() {
        let history = history(&[
            ("OK", vec![100.0; MOMENTUM_WINDOW]),
            ("NEW", vec![100.0; 50]),
        ]);
        let ranking = MomentumRanking::rank(&universe(&["OK", "NEW"]), &history);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.rank_of("NEW"), None);
    }

    #[test]
    fn missing_series_excluded() {
        let history = history(&[("OK", vec![100.0; MOMENTUM_WINDOW])]);
        let ranking = MomentumRanking::rank(&universe(&["OK", "GHOST"]), &history);
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn ties_break_by_universe_order() {
        let history = history(&[
            ("BBB", vec![100.0; MOMENTUM_WINDOW]),
            ("AAA", vec![100.0; MOMENTUM_WINDOW]),
        ]);
        // BBB listed first in the universe wins the tie despite sorting
        // after AAA alphabetically.
        let ranking = MomentumRanking::rank(&universe(&["BBB", "AAA"]), &history);
        assert_eq!(ranking.entries()[0].symbol, "BBB");
        assert_eq!(ranking.entries()[1].symbol, "AAA");
    }

    #[test]
    fn top_handles_small_rankings() {
        let history = history(&[("ONLY", vec![100.0; MOMENTUM_WINDOW])]);
        let ranking = MomentumRanking::rank(&universe(&["ONLY"]), &history);
        assert_eq!(ranking.top(TOP_MOMENTUM).len(), 1);
        assert!(ranking.is_top("ONLY", TOP_MOMENTUM));
    }

    proptest! {
        #[test]
        fn ranks_are_consistent_with_scores(ends in proptest::collection::vec(50.0f64..150.0, 2..12)) {
            let entries: Vec<(String, Vec<f64>)> = ends
                .iter()
                .enumerate()
                .map(|(i, &end)| (format!("S{:02}", i), drift_to(end)))
                .collect();
            let universe: Vec<String> = entries.iter().map(|(s, _)| s.clone()).collect();
            let history: HashMap<String, PriceSeries> = entries
                .iter()
                .map(|(s, closes)| (s.clone(), series(s, closes)))
                .collect();

            let ranking = MomentumRanking::rank(&universe, &history);
            prop_assert_eq!(ranking.len(), ends.len());

            let ranked = ranking.entries();
            for pair in ranked.windows(2) {
                // Strictly higher score ranks strictly better; equal scores
                // keep universe order.
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    let a = universe.iter().position(|s| *s == pair[0].symbol).unwrap();
                    let b = universe.iter().position(|s| *s == pair[1].symbol).unwrap();
                    prop_assert!(a < b);
                }
                prop_assert_eq!(pair[1].rank, pair[0].rank + 1);
            }
        }
    }
}
