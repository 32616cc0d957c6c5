//! Buy-signal generation.
//!
//! Takes the top momentum-ranked symbols, filters them through MACD and RSI
//! bullishness, and scores the survivors. Symbols whose indicators cannot be
//! computed are skipped, never treated as an error.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::config::AlgoConfig;
use crate::domain::indicator::{IndicatorResult, IndicatorUnavailable, MacdSeries, RsiSeries};
use crate::domain::momentum::{MomentumEntry, MomentumRanking, TOP_MOMENTUM};
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{Signal, SignalDetail};

/// Why a ranked candidate dropped out before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSeries,
    MacdUnavailable,
    RsiUnavailable,
}

/// A fully evaluated candidate, ready for filtering and scoring.
#[derive(Debug, Clone)]
pub struct CandidateEval {
    pub symbol: String,
    pub rank: usize,
    pub momentum_score: f64,
    pub macd_value: f64,
    pub rsi_value: f64,
    pub macd_bullish: bool,
    pub rsi_bullish: bool,
}

/// MACD zero-line crossover, or positive and rising.
pub fn macd_bullish(macd: &MacdSeries) -> bool {
    let (Some(current), Some(prev)) = (macd.last(), macd.prev()) else {
        return false;
    };
    let crossover = current > 0.0 && prev <= 0.0;
    let positive_momentum = current > prev && current > 0.0;
    crossover || positive_momentum
}

/// RSI 50-line crossover, or bounce out of oversold territory.
pub fn rsi_bullish(rsi: &RsiSeries) -> bool {
    let (Some(current), Some(prev)) = (rsi.last(), rsi.prev()) else {
        return false;
    };
    let momentum_cross = current > 50.0 && prev <= 50.0;
    let oversold_bounce = current > 30.0 && prev <= 30.0;
    momentum_cross || oversold_bounce
}

/// Composite score: momentum 40%, MACD 30%, RSI 30%. The MACD and RSI terms
/// are capped at 1 from above only; a weak RSI drags the score down.
pub fn signal_strength(rank: usize, macd_value: f64, rsi_value: f64) -> f64 {
    let momentum_strength = (TOP_MOMENTUM + 1 - rank) as f64 / TOP_MOMENTUM as f64;
    let macd_strength = (macd_value.abs() / 2.0).min(1.0);
    let rsi_strength = ((rsi_value - 50.0) / 50.0).min(1.0);
    momentum_strength * 0.4 + macd_strength * 0.3 + rsi_strength * 0.3
}

pub fn evaluate_candidate(
    entry: &MomentumEntry,
    history: &HashMap<String, PriceSeries>,
) -> Result<CandidateEval, SkipReason> {
    let series = history.get(&entry.symbol).ok_or(SkipReason::NoSeries)?;
    let indicators = IndicatorResult::compute(series.closes()).map_err(|u| match u {
        IndicatorUnavailable::Macd => SkipReason::MacdUnavailable,
        IndicatorUnavailable::Rsi => SkipReason::RsiUnavailable,
    })?;

    // Both last() calls are Some here: compute() only succeeds with enough
    // observations for a full window.
    let macd_value = indicators.macd.last().unwrap_or(0.0);
    let rsi_value = indicators.rsi.last().unwrap_or(0.0);

    Ok(CandidateEval {
        symbol: entry.symbol.clone(),
        rank: entry.rank,
        momentum_score: entry.score,
        macd_value,
        rsi_value,
        macd_bullish: macd_bullish(&indicators.macd),
        rsi_bullish: rsi_bullish(&indicators.rsi),
    })
}

/// Generate scored BUY signals for `as_of`, strongest first.
pub fn generate_buy_signals(
    as_of: NaiveDate,
    ranking: &MomentumRanking,
    history: &HashMap<String, PriceSeries>,
    config: &AlgoConfig,
) -> Vec<Signal> {
    let top = ranking.top(TOP_MOMENTUM);
    log::info!("evaluating top {} momentum candidates", top.len());

    let evaluations: Vec<Result<CandidateEval, SkipReason>> = top
        .iter()
        .map(|entry| {
            let result = evaluate_candidate(entry, history);
            if let Err(reason) = &result {
                log::warn!("skipping {}: {:?}", entry.symbol, reason);
            }
            result
        })
        .collect();

    let mut passed_macd = 0usize;
    let mut passed_rsi = 0usize;
    let mut signals: Vec<Signal> = Vec::new();

    for eval in evaluations.into_iter().flatten() {
        if eval.macd_bullish {
            passed_macd += 1;
        }
        if eval.rsi_bullish {
            passed_rsi += 1;
        }

        let passes = (eval.macd_bullish && eval.rsi_bullish)
            || (config.relaxed_filters && (eval.macd_bullish || eval.rsi_bullish));
        if !passes {
            continue;
        }

        signals.push(Signal {
            date: as_of,
            symbol: eval.symbol.clone(),
            strength: signal_strength(eval.rank, eval.macd_value, eval.rsi_value),
            detail: SignalDetail::Buy {
                momentum_rank: eval.rank,
                momentum_score: eval.momentum_score,
                macd_value: eval.macd_value,
                rsi_value: eval.rsi_value,
                macd_bullish: eval.macd_bullish,
                rsi_bullish: eval.rsi_bullish,
            },
            action_taken: None,
        });
    }

    // Stable sort: equal strengths keep momentum-rank order.
    signals.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    log::info!(
        "filter diagnostics ({}): top {} | macd_ok {} | rsi_ok {} | signals {}",
        if config.relaxed_filters { "relaxed" } else { "strict" },
        top.len(),
        passed_macd,
        passed_rsi,
        signals.len()
    );

    signals
}
