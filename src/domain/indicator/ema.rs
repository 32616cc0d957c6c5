//! Exponential moving average.
//!
//! α = 2/(span+1), EMA₀ = first value, EMAₜ = α·xₜ + (1−α)·EMAₜ₋₁.
//! Seeding with the first observation (rather than an SMA warmup) fixes the
//! early-window transients; every downstream consumer assumes this convention.

pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    out.push(current);

    for &value in &values[1..] {
        current = value * alpha + current * (1.0 - alpha);
        out.push(current);
    }

    out
}
