use crate::domain::recommendation::{Recommendation, Signal};
use crate::domain::sentiment::SentimentSummary;
use crate::domain::stock::TechnicalIndicators;

/// Number of voting factors; also the largest reachable score.
pub const MAX_SCORE: i32 = 4;

// Reported alongside every recommendation. The score itself is an unweighted vote sum.
pub const SENTIMENT_WEIGHT: f64 = 0.25;
pub const TECHNICAL_WEIGHT: f64 = 0.75;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const SENTIMENT_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
struct Vote {
    value: i32,
    reason: String,
}

impl Vote {
    fn new(value: i32, reason: String) -> Self {
        Self { value, reason }
    }
}

/// Combines an indicator snapshot and a sentiment summary into a recommendation.
///
/// Inputs are not range-checked; out-of-range readings are scored against the
/// same thresholds as in-range ones.
pub fn recommend(
    ticker: &str,
    current_price: f64,
    indicators: &TechnicalIndicators,
    sentiment: &SentimentSummary,
) -> Recommendation {
    let votes = [
        rsi_vote(indicators.rsi),
        trend_vote(current_price, indicators.sma_50, indicators.sma_200),
        macd_vote(indicators.macd, indicators.macd_signal),
        sentiment_vote(sentiment.overall_sentiment_score),
    ];

    let score: i32 = votes.iter().map(|v| v.value).sum();
    let signal = Signal::from_score(score);
    let reasons = votes.map(|v| v.reason);

    Recommendation {
        ticker: ticker.to_string(),
        recommendation: signal,
        score,
        max_score: MAX_SCORE,
        color: signal.color(),
        reasons,
        sentiment_weight: SENTIMENT_WEIGHT,
        technical_weight: TECHNICAL_WEIGHT,
    }
}

fn rsi_vote(rsi: f64) -> Vote {
    let rsi_s = native(rsi);
    if rsi < RSI_OVERSOLD {
        Vote::new(
            1,
            format!("RSI is oversold at {rsi_s}, suggesting a potential reversal upward."),
        )
    } else if rsi > RSI_OVERBOUGHT {
        Vote::new(
            -1,
            format!("RSI is overbought at {rsi_s}, suggesting a potential correction."),
        )
    } else {
        Vote::new(0, format!("RSI is neutral at {rsi_s}."))
    }
}

fn trend_vote(price: f64, sma_50: f64, sma_200: f64) -> Vote {
    let (p, s50, s200) = (native(price), native(sma_50), native(sma_200));
    if price > sma_50 && price > sma_200 {
        Vote::new(
            1,
            format!(
                "Price {p} is above both the 50-day ({s50}) and 200-day ({s200}) moving averages (Bullish Trend)."
            ),
        )
    } else if price < sma_50 && price < sma_200 {
        Vote::new(
            -1,
            format!(
                "Price {p} is below both the 50-day ({s50}) and 200-day ({s200}) moving averages (Bearish Trend)."
            ),
        )
    } else {
        Vote::new(
            0,
            format!(
                "Moving averages are currently mixed (price {p}, 50-day {s50}, 200-day {s200})."
            ),
        )
    }
}

// Two-way split: equality counts as bearish.
fn macd_vote(macd: f64, signal: f64) -> Vote {
    let (m, s) = (native(macd), native(signal));
    if macd > signal {
        Vote::new(
            1,
            format!("MACD ({m}) is above its signal line ({s}) (Bullish momentum)."),
        )
    } else {
        Vote::new(
            -1,
            format!("MACD ({m}) is below its signal line ({s}) (Bearish momentum)."),
        )
    }
}

fn sentiment_vote(score: f64) -> Vote {
    let score_s = with_min_decimals(score, 2);
    if score > SENTIMENT_THRESHOLD {
        Vote::new(
            1,
            format!("Reddit sentiment is positive ({score_s}), indicating high retail interest."),
        )
    } else if score < -SENTIMENT_THRESHOLD {
        Vote::new(
            -1,
            format!(
                "Reddit sentiment is negative ({score_s}), indicating caution among retail traders."
            ),
        )
    } else {
        Vote::new(
            0,
            format!("Social sentiment is currently neutral ({score_s})."),
        )
    }
}

/// Shortest round-trip rendering, keeping a trailing `.0` on integral values.
fn native(v: f64) -> String {
    with_min_decimals(v, 1)
}

/// Shortest round-trip rendering, zero-padded to at least `min` decimals.
fn with_min_decimals(v: f64, min: usize) -> String {
    let mut s = v.to_string();
    if !v.is_finite() || s.contains(['e', 'E']) {
        return s;
    }
    let decimals = s.split_once('.').map_or(0, |(_, frac)| frac.len());
    if decimals == 0 && min > 0 {
        s.push('.');
    }
    s.extend(std::iter::repeat('0').take(min.saturating_sub(decimals)));
    s
}
