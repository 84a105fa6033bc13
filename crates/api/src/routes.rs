use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use stocksense_core::analysis::{Analyzer, StockAnalysis};
use stocksense_core::domain::stock::{MarketIndexSummary, TickerMatch};
use stocksense_core::error::{AnalysisError, ProviderError};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/api/stock/:ticker", get(get_stock_analysis))
        .route("/api/market-summary", get(get_market_summary))
        .route("/api/search", get(search_stock))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    Internal(anyhow::Error),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            AnalysisError::Upstream(e) => ApiError::Internal(e),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ProviderError::Upstream(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::Internal(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct RootMessage {
    message: &'static str,
}

async fn root() -> Json<RootMessage> {
    Json(RootMessage {
        message: "Stock Analysis & Sentiment API is running",
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_stock_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockAnalysis>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze", %request_id, %ticker);

    let analysis = state.analyzer.analyze(&ticker).instrument(span).await?;
    Ok(Json(analysis))
}

async fn get_market_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<MarketIndexSummary>>, ApiError> {
    Ok(Json(state.analyzer.market_summary().await?))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search_stock(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TickerMatch>>, ApiError> {
    let q = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("query parameter `q` must be non-empty".to_string()))?;

    Ok(Json(state.analyzer.search(&q).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use stocksense_core::domain::sentiment::SentimentSummary;
    use stocksense_core::domain::stock::{
        ChartPoint, EarningsEntry, Financials, NotableMovement, StockData, TechnicalIndicators,
    };
    use stocksense_core::market::MarketDataProvider;
    use stocksense_core::sentiment::{NeutralSentimentProvider, SentimentProvider};
    use tower::ServiceExt;

    struct FakeMarket;

    #[async_trait::async_trait]
    impl MarketDataProvider for FakeMarket {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn stock_data(&self, ticker: &str) -> Result<StockData, ProviderError> {
            match ticker {
                "NOPE" => Err(ProviderError::NotFound {
                    ticker: ticker.to_string(),
                }),
                "DOWN" => Err(anyhow::anyhow!("chart HTTP 503 for DOWN").into()),
                _ => Ok(StockData {
                    ticker: ticker.to_string(),
                    company_name: "Acme Inc.".to_string(),
                    currency: Some("USD".to_string()),
                    exchange: Some("NMS".to_string()),
                    current_price: 80.0,
                    sector: "Technology".to_string(),
                    industry: "Software".to_string(),
                    description: "N/A".to_string(),
                    indicators: TechnicalIndicators {
                        rsi: 80.0,
                        macd: -1.0,
                        macd_signal: 0.5,
                        sma_50: 100.0,
                        sma_200: 110.0,
                        volume: 42,
                    },
                    financials: Financials::default(),
                    earnings: vec![EarningsEntry {
                        date: "3Q2023".to_string(),
                        eps_actual: None,
                        kind: "Historical".to_string(),
                    }],
                    notable_movements: vec![NotableMovement {
                        date: "2023-11-14".to_string(),
                        close: 80.0,
                        pct_change: -3.1,
                        reason: "Market Volatility".to_string(),
                    }],
                    chart_data: vec![ChartPoint {
                        date: "2023-11-14".to_string(),
                        close: 80.0,
                    }],
                }),
            }
        }

        async fn market_summary(&self) -> Result<Vec<MarketIndexSummary>, ProviderError> {
            Ok(vec![MarketIndexSummary {
                symbol: "Nifty 50".to_string(),
                ticker: "^NSEI".to_string(),
                price: 22000.5,
                currency: Some("INR".to_string()),
                change_pct: -0.31,
            }])
        }

        async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, ProviderError> {
            if query == "explode" {
                return Err(anyhow::anyhow!("search HTTP 502").into());
            }
            Ok(vec![TickerMatch {
                symbol: Some("ACME".to_string()),
                name: Some(format!("{query} match")),
                exchange: Some("NYQ".to_string()),
            }])
        }
    }

    struct BearishSentiment;

    #[async_trait::async_trait]
    impl SentimentProvider for BearishSentiment {
        fn provider_name(&self) -> &'static str {
            "bearish"
        }

        async fn sentiment(&self, ticker: &str) -> anyhow::Result<SentimentSummary> {
            Ok(SentimentSummary {
                overall_sentiment_score: -0.3,
                ..SentimentSummary::neutral(ticker)
            })
        }
    }

    fn app(sentiment: Arc<dyn SentimentProvider>) -> Router {
        router(AppState {
            analyzer: Arc::new(Analyzer::new(Arc::new(FakeMarket), sentiment)),
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn stock_route_returns_full_analysis() {
        let (status, body) = get_json(app(Arc::new(BearishSentiment)), "/api/stock/ACME").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock_data"]["ticker"], "ACME");
        assert_eq!(body["stock_data"]["sector"], "Technology");
        assert_eq!(body["stock_data"]["financials"]["income_statement"], serde_json::json!([]));
        assert_eq!(body["stock_data"]["earnings"][0]["EPS Actual"], "N/A");

        let movement = &body["stock_data"]["notable_movements"][0];
        assert_eq!(movement["Date"], "2023-11-14");
        assert_eq!(movement["Close"], 80.0);
        assert_eq!(movement["Pct_Change"], -3.1);
        assert_eq!(movement["Reason"], "Market Volatility");
        assert_eq!(body["stock_data"]["chart_data"][0]["Date"], "2023-11-14");
        assert_eq!(body["stock_data"]["chart_data"][0]["Close"], 80.0);
        assert_eq!(body["sentiment_data"]["overall_sentiment_score"], -0.3);
        assert_eq!(body["recommendation"]["recommendation"], "SELL");
        assert_eq!(body["recommendation"]["score"], -4);
        assert_eq!(body["recommendation"]["max_score"], 4);
        assert_eq!(body["recommendation"]["color"], "red");
        assert_eq!(body["recommendation"]["reasons"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unknown_ticker_is_404() {
        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/stock/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Ticker NOPE not found.");
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_detail() {
        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/stock/DOWN").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "chart HTTP 503 for DOWN");
    }

    #[tokio::test]
    async fn market_summary_lists_indices() {
        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/market-summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["symbol"], "Nifty 50");
        assert_eq!(body[0]["change_pct"], -0.31);
    }

    #[tokio::test]
    async fn search_requires_query() {
        let (status, _) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/search").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/search?q=").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn search_returns_matches_and_surfaces_failures() {
        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/search?q=acme").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["symbol"], "ACME");
        assert_eq!(body[0]["name"], "acme match");

        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/api/search?q=explode").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "search HTTP 502");
    }

    #[tokio::test]
    async fn root_reports_running() {
        let (status, body) = get_json(app(Arc::new(NeutralSentimentProvider)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("running"));
    }
}
