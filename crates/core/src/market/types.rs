//! Wire shapes of the Yahoo Finance chart, search and quoteSummary endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// Per-bar columns. Yahoo reports `null` for bars without trades.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// One daily bar with a usable close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyBar {
    pub timestamp: i64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl ChartResult {
    /// Zips timestamps with closes, dropping bars whose close is null.
    pub fn bars(&self) -> Vec<DailyBar> {
        let Some(series) = self.indicators.quote.first() else {
            return Vec::new();
        };

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = series.close.get(i).copied().flatten()?;
                Some(DailyBar {
                    timestamp: ts,
                    close,
                    volume: series.volume.get(i).copied().flatten(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub quotes: Vec<SearchQuote>,
    #[serde(default)]
    pub news: Vec<SearchNews>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuote {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, rename = "shortname")]
    pub short_name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub quote_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNews {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub provider_publish_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryEnvelope {
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummaryBody {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Only the modules requested by the client are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub asset_profile: Option<AssetProfile>,
    #[serde(default)]
    pub income_statement_history: Option<IncomeStatementHistory>,
    #[serde(default)]
    pub balance_sheet_history: Option<BalanceSheetHistory>,
    #[serde(default)]
    pub cashflow_statement_history: Option<CashflowStatementHistory>,
    #[serde(default)]
    pub earnings: Option<EarningsModule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfile {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub long_business_summary: Option<String>,
}

/// A statement period: `endDate` plus one `{raw, fmt}` object per line item.
pub type RawStatement = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeStatementHistory {
    #[serde(default, rename = "incomeStatementHistory")]
    pub statements: Vec<RawStatement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSheetHistory {
    #[serde(default, rename = "balanceSheetStatements")]
    pub statements: Vec<RawStatement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashflowStatementHistory {
    #[serde(default, rename = "cashflowStatements")]
    pub statements: Vec<RawStatement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsModule {
    #[serde(default)]
    pub earnings_chart: Option<EarningsChart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsChart {
    #[serde(default)]
    pub quarterly: Vec<QuarterlyEps>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterlyEps {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub actual: Option<YahooNumber>,
}

/// Yahoo's `{raw, fmt}` number wrapper; `{}` when the value is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YahooNumber {
    #[serde(default)]
    pub raw: Option<f64>,
    #[serde(default)]
    pub fmt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_chart_and_skips_null_closes() {
        let v = json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "currency": "USD",
                        "exchangeName": "NMS",
                        "longName": "Apple Inc.",
                        "regularMarketPrice": 191.5
                    },
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "close": [189.0, null, 191.5],
                            "volume": [1000, null, null]
                        }]
                    }
                }],
                "error": null
            }
        });

        let parsed: ChartEnvelope = serde_json::from_value(v).unwrap();
        let result = &parsed.chart.result.unwrap()[0];
        assert_eq!(result.meta.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(result.meta.regular_market_price, Some(191.5));

        let bars = result.bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, Some(1000));
        assert_eq!(bars[1].close, 191.5);
        assert_eq!(bars[1].volume, None);
    }

    #[test]
    fn parses_chart_error_body() {
        let v = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        });
        let parsed: ChartEnvelope = serde_json::from_value(v).unwrap();
        assert!(parsed.chart.result.is_none());
        assert_eq!(parsed.chart.error.unwrap().code, "Not Found");
    }

    #[test]
    fn parses_search_quotes_and_news() {
        let v = json!({
            "quotes": [
                {"symbol": "AAPL", "shortname": "Apple Inc.", "exchange": "NMS", "quoteType": "EQUITY"},
                {"symbol": "AAPL240119C", "quoteType": "OPTION"}
            ],
            "news": [{"title": "Apple beats", "providerPublishTime": 1700000000}]
        });
        let parsed: SearchResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.quotes.len(), 2);
        assert_eq!(parsed.quotes[0].short_name.as_deref(), Some("Apple Inc."));
        assert_eq!(parsed.quotes[1].quote_type.as_deref(), Some("OPTION"));
        assert_eq!(parsed.news[0].provider_publish_time, Some(1700000000));
    }

    #[test]
    fn parses_quote_summary_modules() {
        let v = json!({
            "quoteSummary": {
                "result": [{
                    "assetProfile": {
                        "sector": "Technology",
                        "industry": "Consumer Electronics",
                        "longBusinessSummary": "Apple Inc. designs smartphones.",
                        "fullTimeEmployees": 161000
                    },
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [{
                            "maxAge": 1,
                            "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                            "totalRevenue": {"raw": 383285000000.0, "fmt": "383.29B"},
                            "netIncome": {}
                        }],
                        "maxAge": 86400
                    },
                    "balanceSheetHistory": {
                        "balanceSheetStatements": [{
                            "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                            "cash": {"raw": 29965000000.0, "fmt": "29.97B"}
                        }]
                    },
                    "cashflowStatementHistory": {"cashflowStatements": []},
                    "earnings": {
                        "earningsChart": {
                            "quarterly": [
                                {"date": "3Q2023", "actual": {"raw": 1.46, "fmt": "1.46"}, "estimate": {"raw": 1.39}},
                                {"date": "4Q2023", "actual": {}}
                            ]
                        }
                    }
                }],
                "error": null
            }
        });

        let parsed: QuoteSummaryEnvelope = serde_json::from_value(v).unwrap();
        let result = &parsed.quote_summary.result.unwrap()[0];

        let profile = result.asset_profile.as_ref().unwrap();
        assert_eq!(profile.sector.as_deref(), Some("Technology"));
        assert_eq!(
            profile.long_business_summary.as_deref(),
            Some("Apple Inc. designs smartphones.")
        );

        let income = &result.income_statement_history.as_ref().unwrap().statements;
        assert_eq!(income.len(), 1);
        assert_eq!(income[0]["endDate"]["fmt"], "2023-09-30");
        assert_eq!(income[0]["totalRevenue"]["raw"], 383285000000.0);

        let balance = &result.balance_sheet_history.as_ref().unwrap().statements;
        assert_eq!(balance[0]["cash"]["fmt"], "29.97B");
        assert!(result.cashflow_statement_history.as_ref().unwrap().statements.is_empty());

        let quarterly = &result.earnings.as_ref().unwrap().earnings_chart.as_ref().unwrap().quarterly;
        assert_eq!(quarterly[0].actual.as_ref().unwrap().raw, Some(1.46));
        assert_eq!(quarterly[1].actual, Some(YahooNumber::default()));
    }

    #[test]
    fn parses_quote_summary_error_and_missing_modules() {
        let v = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: ZZZZ"}
            }
        });
        let parsed: QuoteSummaryEnvelope = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.quote_summary.error.unwrap().code, "Not Found");

        let partial: QuoteSummaryResult =
            serde_json::from_value(json!({"assetProfile": {"sector": "Energy"}})).unwrap();
        assert!(partial.earnings.is_none());
        assert!(partial.asset_profile.unwrap().industry.is_none());
    }
}
