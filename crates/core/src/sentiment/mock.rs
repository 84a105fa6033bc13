use crate::domain::sentiment::{ScoredPost, SentimentSummary};
use crate::market::movements::round_to;
use crate::sentiment::SentimentProvider;
use rand::Rng;

/// Random sentiment for demos without Reddit credentials. Only built when
/// `SENTIMENT_MOCK` is enabled; results are not reproducible.
#[derive(Debug, Clone, Default)]
pub struct MockSentimentProvider;

impl MockSentimentProvider {
    pub fn generate<R: Rng + ?Sized>(ticker: &str, rng: &mut R) -> SentimentSummary {
        let score: f64 = rng.gen_range(-0.5..0.8);
        let num_posts: usize = rng.gen_range(10..=50);
        let bullish_pct = round_to((score + 1.0) / 2.0 * 100.0, 1);

        SentimentSummary {
            ticker: ticker.to_string(),
            overall_sentiment_score: round_to(score, 2),
            bullish_pct,
            bearish_pct: round_to(100.0 - bullish_pct, 1),
            num_posts_analyzed: num_posts,
            top_posts: vec![
                ScoredPost {
                    title: format!("Bullish on {ticker}"),
                    sentiment: 0.8,
                    url: "#".to_string(),
                    score: 0,
                },
                ScoredPost {
                    title: format!("Why {ticker} is a sell"),
                    sentiment: -0.6,
                    url: "#".to_string(),
                    score: 0,
                },
            ],
        }
    }
}

#[async_trait::async_trait]
impl SentimentProvider for MockSentimentProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn sentiment(&self, ticker: &str) -> anyhow::Result<SentimentSummary> {
        Ok(Self::generate(ticker, &mut rand::thread_rng()))
    }
}
