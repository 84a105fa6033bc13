use crate::domain::recommendation::Recommendation;
use crate::domain::sentiment::SentimentSummary;
use crate::domain::stock::TechnicalIndicators;
use crate::engine;
use crate::error::EngineError;
use serde_json::Value;

/// Engine inputs extracted from a loosely-typed `{stock_data, sentiment_data}` document,
/// such as a saved analysis or a snapshot produced by another tool.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineInput {
    pub ticker: String,
    pub current_price: f64,
    pub indicators: TechnicalIndicators,
    pub sentiment: SentimentSummary,
}

impl EngineInput {
    pub fn from_json(doc: &Value) -> Result<Self, EngineError> {
        let ticker = doc
            .pointer("/stock_data/ticker")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::MissingField("stock_data.ticker".to_string()))?
            .to_string();

        let current_price = number(doc, "/stock_data/current_price")?;

        let indicators = TechnicalIndicators {
            rsi: number(doc, "/stock_data/indicators/rsi")?,
            macd: number(doc, "/stock_data/indicators/macd")?,
            macd_signal: number(doc, "/stock_data/indicators/macd_signal")?,
            sma_50: number(doc, "/stock_data/indicators/sma_50")?,
            sma_200: number(doc, "/stock_data/indicators/sma_200")?,
            // Not consulted by the engine.
            volume: doc
                .pointer("/stock_data/indicators/volume")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        };

        let score = number(doc, "/sentiment_data/overall_sentiment_score")?;
        let sentiment = SentimentSummary {
            overall_sentiment_score: score,
            ..SentimentSummary::neutral(&ticker)
        };

        Ok(Self {
            ticker,
            current_price,
            indicators,
            sentiment,
        })
    }

    pub fn recommend(&self) -> Recommendation {
        engine::recommend(
            &self.ticker,
            self.current_price,
            &self.indicators,
            &self.sentiment,
        )
    }
}

fn number(doc: &Value, pointer: &str) -> Result<f64, EngineError> {
    doc.pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| EngineError::MissingField(pointer.trim_start_matches('/').replace('/', ".")))
}
