//! Indicator math over daily closes. Each series is aligned to the end of the
//! input: the last element always corresponds to the last close.

use crate::domain::stock::TechnicalIndicators;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const SMA_SHORT: usize = 50;
pub const SMA_LONG: usize = 200;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    data.windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Exponential Moving Average, seeded with the SMA of the first `period` values.
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len() - period + 1);
    let mut prev = data[..period].iter().sum::<f64>() / period as f64;
    out.push(prev);
    for &x in &data[period..] {
        prev = (x - prev) * k + prev;
        out.push(prev);
    }
    out
}

/// Relative Strength Index with Wilder smoothing.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let changes: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| c.max(0.0);
    let loss = |c: f64| (-c).max(0.0);

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(rsi_from(avg_gain, avg_loss));
    for &c in &changes[period..] {
        avg_gain = (avg_gain * (period - 1) as f64 + gain(c)) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss(c)) / period as f64;
        out.push(rsi_from(avg_gain, avg_loss));
    }
    out
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
}

/// MACD (Moving Average Convergence Divergence)
pub fn macd(data: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    if fast == 0 || signal == 0 || slow <= fast {
        return MacdResult {
            macd_line: vec![],
            signal_line: vec![],
        };
    }

    let ema_fast = ema(data, fast);
    let ema_slow = ema(data, slow);
    let offset = slow - fast;

    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, s)| ema_fast[i + offset] - s)
        .collect();
    let signal_line = ema(&macd_line, signal);

    MacdResult {
        macd_line,
        signal_line,
    }
}

fn last_or_zero(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(0.0)
}

/// Latest indicator readings. Indicators lacking enough history read as 0.0.
pub fn latest_indicators(closes: &[f64], last_volume: u64) -> TechnicalIndicators {
    let m = macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    // MACD and its signal are reported as a pair or not at all.
    let (macd_value, signal_value) = match (m.macd_line.last(), m.signal_line.last()) {
        (Some(&l), Some(&s)) => (l, s),
        _ => (0.0, 0.0),
    };

    TechnicalIndicators {
        rsi: last_or_zero(&rsi(closes, RSI_PERIOD)),
        macd: macd_value,
        macd_signal: signal_value,
        sma_50: last_or_zero(&sma(closes, SMA_SHORT)),
        sma_200: last_or_zero(&sma(closes, SMA_LONG)),
        volume: last_volume,
    }
}
