use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub ticker: String,
    /// Mean compound score over the analysed posts, nominally in [-1, 1].
    pub overall_sentiment_score: f64,
    pub bullish_pct: f64,
    pub bearish_pct: f64,
    pub num_posts_analyzed: usize,
    pub top_posts: Vec<ScoredPost>,
}

impl SentimentSummary {
    /// Result used when no relevant posts exist for the ticker.
    pub fn neutral(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            overall_sentiment_score: 0.0,
            bullish_pct: 50.0,
            bearish_pct: 50.0,
            num_posts_analyzed: 0,
            top_posts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub title: String,
    pub sentiment: f64,
    pub url: String,
    /// Upvote score reported by the source, not the sentiment.
    pub score: i64,
}
