use crate::domain::stock::{ChartPoint, NotableMovement};
use crate::market::types::{DailyBar, SearchNews};
use chrono::{DateTime, NaiveDate};

const NOTABLE_PCT: f64 = 2.0;
const MAX_MOVEMENTS: usize = 5;
const CHART_POINTS: usize = 100;
const DEFAULT_REASON: &str = "Market Volatility";

/// A headline reduced to its UTC publish date.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub title: String,
    pub published: NaiveDate,
}

impl Headline {
    pub fn from_search_news(news: &[SearchNews]) -> Vec<Headline> {
        news.iter()
            .filter_map(|n| {
                let title = n.title.clone().filter(|t| !t.trim().is_empty())?;
                let published = DateTime::from_timestamp(n.provider_publish_time?, 0)?.date_naive();
                Some(Headline { title, published })
            })
            .collect()
    }
}

pub fn bar_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

pub fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

/// The last few days whose close moved more than 2% from the previous close,
/// each labelled with a same-day headline when one exists.
pub fn notable_movements(bars: &[DailyBar], headlines: &[Headline]) -> Vec<NotableMovement> {
    let mut out: Vec<NotableMovement> = bars
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0], w[1]);
            if prev.close == 0.0 {
                return None;
            }
            let pct = (cur.close - prev.close) / prev.close * 100.0;
            if !pct.is_finite() || pct.abs() <= NOTABLE_PCT {
                return None;
            }
            let date = bar_date(cur.timestamp)?;
            let reason = headlines
                .iter()
                .find(|h| h.published == date)
                .map(|h| h.title.clone())
                .unwrap_or_else(|| DEFAULT_REASON.to_string());

            Some(NotableMovement {
                date: date.format("%Y-%m-%d").to_string(),
                close: cur.close,
                pct_change: round_to(pct, 2),
                reason,
            })
        })
        .collect();

    let skip = out.len().saturating_sub(MAX_MOVEMENTS);
    out.drain(..skip);
    out
}

pub fn chart_data(bars: &[DailyBar]) -> Vec<ChartPoint> {
    let start = bars.len().saturating_sub(CHART_POINTS);
    bars[start..]
        .iter()
        .filter_map(|b| {
            Some(ChartPoint {
                date: bar_date(b.timestamp)?.format("%Y-%m-%d").to_string(),
                close: b.close,
            })
        })
        .collect()
}
