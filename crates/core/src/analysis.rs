use crate::config::Settings;
use crate::domain::recommendation::Recommendation;
use crate::domain::sentiment::SentimentSummary;
use crate::domain::stock::{MarketIndexSummary, StockData, TickerMatch};
use crate::engine;
use crate::error::{AnalysisError, ProviderError};
use crate::market::yahoo::YahooFinanceClient;
use crate::market::MarketDataProvider;
use crate::sentiment::mock::MockSentimentProvider;
use crate::sentiment::reddit::RedditSentimentProvider;
use crate::sentiment::{NeutralSentimentProvider, SentimentProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub stock_data: StockData,
    pub sentiment_data: SentimentSummary,
    pub recommendation: Recommendation,
}

/// Wires the market-data and sentiment collaborators to the engine. Built once
/// per process and shared between requests.
#[derive(Clone)]
pub struct Analyzer {
    market: Arc<dyn MarketDataProvider>,
    sentiment: Arc<dyn SentimentProvider>,
}

impl Analyzer {
    pub fn new(market: Arc<dyn MarketDataProvider>, sentiment: Arc<dyn SentimentProvider>) -> Self {
        Self { market, sentiment }
    }

    /// Yahoo Finance for prices; Reddit for sentiment when credentials are set,
    /// random data when `SENTIMENT_MOCK` is on, otherwise neutral sentiment.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let market: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceClient::from_settings(settings)?);

        let sentiment: Arc<dyn SentimentProvider> = if settings.sentiment_mock {
            tracing::warn!("SENTIMENT_MOCK enabled; sentiment scores are random");
            Arc::new(MockSentimentProvider)
        } else if settings.has_reddit_credentials() {
            Arc::new(RedditSentimentProvider::from_settings(settings)?)
        } else {
            tracing::warn!("reddit credentials missing; sentiment will be reported as neutral");
            Arc::new(NeutralSentimentProvider)
        };

        tracing::info!(
            market = market.provider_name(),
            sentiment = sentiment.provider_name(),
            "analysis providers ready"
        );

        Ok(Self::new(market, sentiment))
    }

    /// Fetches indicators and sentiment concurrently, then scores them. Fails
    /// as soon as either fetch fails.
    pub async fn analyze(&self, ticker: &str) -> Result<StockAnalysis, AnalysisError> {
        let (stock_data, sentiment_data) = tokio::try_join!(
            async { self.market.stock_data(ticker).await.map_err(AnalysisError::from) },
            async {
                self.sentiment
                    .sentiment(ticker)
                    .await
                    .map_err(AnalysisError::Upstream)
            },
        )?;

        let recommendation = engine::recommend(
            &stock_data.ticker,
            stock_data.current_price,
            &stock_data.indicators,
            &sentiment_data,
        );

        tracing::info!(
            ticker = %stock_data.ticker,
            score = recommendation.score,
            recommendation = ?recommendation.recommendation,
            "analysis complete"
        );

        Ok(StockAnalysis {
            stock_data,
            sentiment_data,
            recommendation,
        })
    }

    pub async fn market_summary(&self) -> Result<Vec<MarketIndexSummary>, ProviderError> {
        self.market.market_summary().await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, ProviderError> {
        self.market.search(query).await
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::domain::stock::{Financials, TechnicalIndicators};

    pub struct FakeMarket;

    pub fn stock(ticker: &str) -> StockData {
        StockData {
            ticker: ticker.to_string(),
            company_name: format!("{ticker} Corp"),
            currency: Some("USD".to_string()),
            exchange: Some("NMS".to_string()),
            current_price: 110.0,
            sector: "Technology".to_string(),
            industry: "Software".to_string(),
            description: "N/A".to_string(),
            indicators: TechnicalIndicators {
                rsi: 25.0,
                macd: 2.0,
                macd_signal: 1.0,
                sma_50: 100.0,
                sma_200: 95.0,
                volume: 1_000,
            },
            financials: Financials::default(),
            earnings: Vec::new(),
            notable_movements: Vec::new(),
            chart_data: Vec::new(),
        }
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for FakeMarket {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn stock_data(&self, ticker: &str) -> Result<StockData, ProviderError> {
            match ticker {
                "MISSING" => Err(ProviderError::NotFound {
                    ticker: ticker.to_string(),
                }),
                "BROKEN" => Err(anyhow::anyhow!("chart HTTP 503").into()),
                _ => Ok(stock(ticker)),
            }
        }

        async fn market_summary(&self) -> Result<Vec<MarketIndexSummary>, ProviderError> {
            Ok(vec![MarketIndexSummary {
                symbol: "S&P 500".to_string(),
                ticker: "^GSPC".to_string(),
                price: 5000.0,
                currency: Some("USD".to_string()),
                change_pct: 0.5,
            }])
        }

        async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, ProviderError> {
            if query == "boom" {
                return Err(anyhow::anyhow!("search HTTP 500").into());
            }
            Ok(vec![TickerMatch {
                symbol: Some(query.to_uppercase()),
                name: Some("Match".to_string()),
                exchange: Some("NMS".to_string()),
            }])
        }
    }

    pub struct FixedSentiment(pub f64);

    #[async_trait::async_trait]
    impl SentimentProvider for FixedSentiment {
        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        async fn sentiment(&self, ticker: &str) -> anyhow::Result<SentimentSummary> {
            Ok(SentimentSummary {
                overall_sentiment_score: self.0,
                ..SentimentSummary::neutral(ticker)
            })
        }
    }

    pub struct FailingSentiment;

    #[async_trait::async_trait]
    impl SentimentProvider for FailingSentiment {
        fn provider_name(&self) -> &'static str {
            "failing"
        }

        async fn sentiment(&self, _ticker: &str) -> anyhow::Result<SentimentSummary> {
            anyhow::bail!("reddit token HTTP 401")
        }
    }
}
