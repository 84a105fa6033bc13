use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for profile fields and amounts the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Indicator snapshot for one ticker, taken from the most recent daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub ticker: String,
    pub company_name: String,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub current_price: f64,
    pub sector: String,
    pub industry: String,
    pub description: String,
    pub indicators: TechnicalIndicators,
    pub financials: Financials,
    pub earnings: Vec<EarningsEntry>,
    pub notable_movements: Vec<NotableMovement>,
    pub chart_data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotableMovement {
    pub date: String,
    pub close: f64,
    #[serde(rename = "Pct_Change")]
    pub pct_change: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChartPoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub income_statement: Vec<StatementRow>,
    pub balance_sheet: Vec<StatementRow>,
    pub cash_flow: Vec<StatementRow>,
}

/// One line item; `values` maps a period end date to its formatted amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub metric: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEntry {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "EPS Actual", with = "number_or_na")]
    pub eps_actual: Option<f64>,
    #[serde(rename = "Type")]
    pub kind: String,
}

/// `Option<f64>` on the wire as a number or `"N/A"`.
mod number_or_na {
    use super::NOT_AVAILABLE;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(x) => s.serialize_f64(*x),
            None => s.serialize_str(NOT_AVAILABLE),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Raw::deserialize(d)? {
            Raw::Number(x) => Some(x),
            Raw::Text(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIndexSummary {
    /// Display name, e.g. "S&P 500".
    pub symbol: String,
    pub ticker: String,
    pub price: f64,
    pub currency: Option<String>,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMatch {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
}
