use crate::config::Settings;
use crate::domain::stock::{MarketIndexSummary, StockData, TickerMatch};
use crate::error::ProviderError;
use crate::market::fundamentals::Fundamentals;
use crate::market::indicators::latest_indicators;
use crate::market::movements::{chart_data, notable_movements, round_to, Headline};
use crate::market::types::{ChartEnvelope, ChartResult, QuoteSummaryEnvelope, SearchResponse};
use crate::market::MarketDataProvider;
use anyhow::{anyhow, Context};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

// Yahoo rejects requests without a browser-like agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

const HISTORY_RANGE: &str = "1y";
const INDEX_RANGE: &str = "5d";
const MAX_SEARCH_RESULTS: usize = 10;
const MAX_NEWS: usize = 15;
const SUMMARY_MODULES: &str =
    "assetProfile,incomeStatementHistory,balanceSheetHistory,cashflowStatementHistory,earnings";

/// Indices reported by the market summary: (ticker, display name).
pub const MARKET_INDICES: &[(&str, &str)] = &[("^GSPC", "S&P 500"), ("^NSEI", "Nifty 50")];

#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooFinanceClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Self::new(
            &settings.yahoo_base_url,
            Duration::from_secs(settings.market_data_timeout_secs),
        )
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid Yahoo Finance base url: {base_url}"))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> anyhow::Result<(StatusCode, String)> {
        let res = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("market data request failed: {url}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        Ok((status, text))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let (status, text) = self.get(url, query).await?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }
        serde_json::from_str::<T>(&text)
            .with_context(|| format!("market data response has unexpected shape: {text}"))
    }

    async fn fetch_chart(&self, ticker: &str, range: &str) -> Result<ChartResult, ProviderError> {
        let not_found = || ProviderError::NotFound {
            ticker: ticker.to_string(),
        };

        let url = self.url(&["v8", "finance", "chart", ticker])?;
        let (status, text) = self
            .get(url, &[("range", range), ("interval", "1d")])
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }

        let envelope = serde_json::from_str::<ChartEnvelope>(&text);
        if !status.is_success() {
            return Err(anyhow!("chart HTTP {status} for {ticker}: {text}").into());
        }
        let envelope = envelope.with_context(|| format!("chart response for {ticker} is not valid: {text}"))?;

        if let Some(err) = envelope.chart.error {
            if err.code.eq_ignore_ascii_case("Not Found") {
                return Err(not_found());
            }
            return Err(anyhow!(
                "chart error for {ticker}: {} ({})",
                err.code,
                err.description.unwrap_or_default()
            )
            .into());
        }

        envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(not_found)
    }

    async fn headlines(&self, ticker: &str) -> anyhow::Result<Vec<Headline>> {
        let url = self.url(&["v1", "finance", "search"])?;
        let news_count = MAX_NEWS.to_string();
        let resp: SearchResponse = self
            .get_json(
                url,
                &[("q", ticker), ("quotesCount", "0"), ("newsCount", news_count.as_str())],
            )
            .await?;

        let news: Vec<_> = resp.news.into_iter().take(MAX_NEWS).collect();
        Ok(Headline::from_search_news(&news))
    }

    async fn fundamentals(&self, ticker: &str) -> anyhow::Result<Fundamentals> {
        let url = self.url(&["v10", "finance", "quoteSummary", ticker])?;
        let envelope: QuoteSummaryEnvelope = self
            .get_json(url, &[("modules", SUMMARY_MODULES)])
            .await?;

        if let Some(err) = envelope.quote_summary.error {
            anyhow::bail!(
                "quoteSummary error for {ticker}: {} ({})",
                err.code,
                err.description.unwrap_or_default()
            );
        }

        let result = envelope
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| anyhow!("quoteSummary for {ticker} has no result"))?;
        Ok(Fundamentals::from_quote_summary(result))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn stock_data(&self, ticker: &str) -> Result<StockData, ProviderError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(ProviderError::NotFound {
                ticker: ticker.to_string(),
            });
        }

        let (chart, headlines, fundamentals) = tokio::join!(
            self.fetch_chart(ticker, HISTORY_RANGE),
            self.headlines(ticker),
            self.fundamentals(ticker)
        );
        let chart = chart?;
        let headlines = headlines.unwrap_or_else(|err| {
            tracing::warn!(%ticker, error = %err, "news lookup failed; movements will carry no headlines");
            Vec::new()
        });
        let fundamentals = fundamentals.unwrap_or_else(|err| {
            tracing::warn!(%ticker, error = %err, "fundamentals lookup failed; profile reported as N/A");
            Fundamentals::unavailable()
        });

        let bars = chart.bars();
        let Some(last) = bars.last() else {
            return Err(ProviderError::NotFound {
                ticker: ticker.to_string(),
            });
        };

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let current_price = chart
            .meta
            .regular_market_price
            .filter(|p| p.is_finite() && *p != 0.0)
            .unwrap_or(last.close);

        let meta = chart.meta;
        let company_name = meta
            .long_name
            .or(meta.short_name)
            .unwrap_or_else(|| ticker.to_string());

        tracing::debug!(%ticker, bars = bars.len(), "computed indicators from daily history");

        Ok(StockData {
            ticker: ticker.to_string(),
            company_name,
            currency: meta.currency,
            exchange: meta.exchange_name,
            current_price,
            sector: fundamentals.sector,
            industry: fundamentals.industry,
            description: fundamentals.description,
            indicators: latest_indicators(&closes, last.volume.unwrap_or(0)),
            financials: fundamentals.financials,
            earnings: fundamentals.earnings,
            notable_movements: notable_movements(&bars, &headlines),
            chart_data: chart_data(&bars),
        })
    }

    async fn market_summary(&self) -> Result<Vec<MarketIndexSummary>, ProviderError> {
        let mut out = Vec::with_capacity(MARKET_INDICES.len());
        for &(ticker, name) in MARKET_INDICES {
            match self.fetch_chart(ticker, INDEX_RANGE).await {
                Ok(chart) => {
                    let bars = chart.bars();
                    let Some(last) = bars.last() else {
                        tracing::warn!(%ticker, "index history empty; skipping");
                        continue;
                    };
                    let prev = bars.len().checked_sub(2).map_or(last, |i| &bars[i]);
                    let change_pct = if prev.close == 0.0 {
                        0.0
                    } else {
                        round_to((last.close - prev.close) / prev.close * 100.0, 2)
                    };
                    out.push(MarketIndexSummary {
                        symbol: name.to_string(),
                        ticker: ticker.to_string(),
                        price: last.close,
                        currency: chart.meta.currency,
                        change_pct,
                    });
                }
                Err(err) => {
                    tracing::warn!(%ticker, error = %err, "index fetch failed; skipping");
                }
            }
        }
        Ok(out)
    }

    async fn search(&self, query: &str) -> Result<Vec<TickerMatch>, ProviderError> {
        let url = self.url(&["v1", "finance", "search"])?;
        let count = MAX_SEARCH_RESULTS.to_string();
        let resp: SearchResponse = self
            .get_json(
                url,
                &[("q", query.trim()), ("quotesCount", count.as_str()), ("newsCount", "0")],
            )
            .await?;

        Ok(equity_matches(resp))
    }
}

fn equity_matches(resp: SearchResponse) -> Vec<TickerMatch> {
    resp.quotes
        .into_iter()
        .filter(|q| q.quote_type.as_deref() == Some("EQUITY"))
        .take(MAX_SEARCH_RESULTS)
        .map(|q| TickerMatch {
            symbol: q.symbol,
            name: q.short_name,
            exchange: q.exchange,
        })
        .collect()
}
