pub mod lexicon;
pub mod mock;
pub mod reddit;

use crate::domain::sentiment::{ScoredPost, SentimentSummary};
use crate::market::movements::round_to;

const BULLISH_POST: f64 = 0.1;
const TOP_POSTS: usize = 5;

#[async_trait::async_trait]
pub trait SentimentProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn sentiment(&self, ticker: &str) -> anyhow::Result<SentimentSummary>;
}

/// Reports the no-data result for every ticker.
#[derive(Debug, Clone, Default)]
pub struct NeutralSentimentProvider;

#[async_trait::async_trait]
impl SentimentProvider for NeutralSentimentProvider {
    fn provider_name(&self) -> &'static str {
        "neutral"
    }

    async fn sentiment(&self, ticker: &str) -> anyhow::Result<SentimentSummary> {
        Ok(SentimentSummary::neutral(ticker))
    }
}

/// Aggregates scored posts into a summary.
pub fn summarize(ticker: &str, mut posts: Vec<ScoredPost>) -> SentimentSummary {
    if posts.is_empty() {
        return SentimentSummary::neutral(ticker);
    }

    let n = posts.len();
    let mean = posts.iter().map(|p| p.sentiment).sum::<f64>() / n as f64;
    let bullish = posts.iter().filter(|p| p.sentiment > BULLISH_POST).count();
    // Bearish is reported as the complement, so neutral posts land there.
    let bullish_pct = bullish as f64 / n as f64 * 100.0;

    posts.sort_by(|a, b| b.sentiment.abs().total_cmp(&a.sentiment.abs()));
    posts.truncate(TOP_POSTS);

    SentimentSummary {
        ticker: ticker.to_string(),
        overall_sentiment_score: round_to(mean, 2),
        bullish_pct: round_to(bullish_pct, 1),
        bearish_pct: round_to(100.0 - bullish_pct, 1),
        num_posts_analyzed: n,
        top_posts: posts,
    }
}
