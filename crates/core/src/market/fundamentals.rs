use crate::domain::stock::{EarningsEntry, Financials, StatementRow, NOT_AVAILABLE};
use crate::market::movements::bar_date;
use crate::market::types::{QuoteSummaryResult, RawStatement};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const EARNINGS_KIND: &str = "Historical";

// Statement keys that are bookkeeping, not line items.
const SKIPPED_KEYS: &[&str] = &["endDate", "maxAge"];

/// Company profile, statements and EPS history for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Fundamentals {
    pub sector: String,
    pub industry: String,
    pub description: String,
    pub financials: Financials,
    pub earnings: Vec<EarningsEntry>,
}

impl Fundamentals {
    pub fn unavailable() -> Self {
        Self {
            sector: NOT_AVAILABLE.to_string(),
            industry: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            financials: Financials::default(),
            earnings: Vec::new(),
        }
    }

    pub fn from_quote_summary(result: QuoteSummaryResult) -> Self {
        let profile = result.asset_profile.unwrap_or_default();

        let financials = Financials {
            income_statement: statement_rows(
                &result.income_statement_history.unwrap_or_default().statements,
            ),
            balance_sheet: statement_rows(&result.balance_sheet_history.unwrap_or_default().statements),
            cash_flow: statement_rows(
                &result.cashflow_statement_history.unwrap_or_default().statements,
            ),
        };

        let earnings = result
            .earnings
            .and_then(|e| e.earnings_chart)
            .map(|chart| {
                chart
                    .quarterly
                    .into_iter()
                    .filter_map(|q| {
                        Some(EarningsEntry {
                            date: q.date.filter(|d| !d.trim().is_empty())?,
                            eps_actual: q.actual.and_then(|a| a.raw).filter(|v| v.is_finite()),
                            kind: EARNINGS_KIND.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            sector: or_na(profile.sector),
            industry: or_na(profile.industry),
            description: or_na(profile.long_business_summary),
            financials,
            earnings,
        }
    }
}

fn or_na(v: Option<String>) -> String {
    v.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Pivots per-period statements into one row per line item, with a column per
/// period end date. A line item missing from a period shows `"N/A"` there.
pub fn statement_rows(statements: &[RawStatement]) -> Vec<StatementRow> {
    let mut periods = BTreeSet::new();
    let mut rows: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for statement in statements {
        let Some(period) = period_label(statement) else {
            continue;
        };
        periods.insert(period.clone());

        for (key, value) in statement {
            if SKIPPED_KEYS.contains(&key.as_str()) || !value.is_object() {
                continue;
            }
            let amount = value
                .get("raw")
                .and_then(Value::as_f64)
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_amount);
            rows.entry(metric_label(key))
                .or_default()
                .insert(period.clone(), amount);
        }
    }

    rows.into_iter()
        .map(|(metric, mut values)| {
            for period in &periods {
                values
                    .entry(period.clone())
                    .or_insert_with(|| NOT_AVAILABLE.to_string());
            }
            StatementRow { metric, values }
        })
        .collect()
}

fn period_label(statement: &RawStatement) -> Option<String> {
    let end = statement.get("endDate")?;
    if let Some(fmt) = end.get("fmt").and_then(Value::as_str) {
        return Some(fmt.to_string());
    }
    let raw = end.get("raw").and_then(Value::as_i64)?;
    bar_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// `1.23B`, `4.56M` or `7.89`.
pub fn format_amount(v: f64) -> String {
    if !v.is_finite() {
        NOT_AVAILABLE.to_string()
    } else if v.abs() >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if v.abs() >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else {
        format!("{v:.2}")
    }
}

/// `totalRevenue` -> `Total Revenue`.
fn metric_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_ascii_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::{AssetProfile, EarningsChart, EarningsModule, QuarterlyEps, YahooNumber};
    use serde_json::json;

    fn statement(v: Value) -> RawStatement {
        match v {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn formats_amounts_by_magnitude() {
        assert_eq!(format_amount(383_285_000_000.0), "383.29B");
        assert_eq!(format_amount(-2_500_000.0), "-2.50M");
        assert_eq!(format_amount(1234.5), "1234.50");
        assert_eq!(format_amount(f64::NAN), "N/A");
    }

    #[test]
    fn labels_camel_case_keys() {
        assert_eq!(metric_label("totalRevenue"), "Total Revenue");
        assert_eq!(metric_label("netIncome"), "Net Income");
        assert_eq!(metric_label("ebit"), "Ebit");
    }

    #[test]
    fn pivots_statements_into_rows() {
        let statements = vec![
            statement(json!({
                "maxAge": 1,
                "endDate": {"raw": 1696032000, "fmt": "2023-09-30"},
                "totalRevenue": {"raw": 383285000000.0, "fmt": "383.29B"},
                "netIncome": {"raw": 96995000000.0},
                "grossProfit": {}
            })),
            statement(json!({
                "endDate": {"raw": 1664496000},
                "totalRevenue": {"raw": 394328000000.0}
            })),
            statement(json!({"totalRevenue": {"raw": 1.0}})),
        ];

        let rows = statement_rows(&statements);
        let metrics: Vec<_> = rows.iter().map(|r| r.metric.as_str()).collect();
        assert_eq!(metrics, vec!["Gross Profit", "Net Income", "Total Revenue"]);

        let revenue = &rows[2];
        assert_eq!(revenue.values["2023-09-30"], "383.29B");
        assert_eq!(revenue.values["2022-09-30"], "394.33B");
        assert_eq!(revenue.values.len(), 2);

        assert_eq!(rows[0].values["2023-09-30"], "N/A");
        assert_eq!(rows[1].values["2022-09-30"], "N/A");
    }

    #[test]
    fn builds_fundamentals_from_modules() {
        let result = QuoteSummaryResult {
            asset_profile: Some(AssetProfile {
                sector: Some("Technology".to_string()),
                industry: Some("  ".to_string()),
                long_business_summary: None,
            }),
            earnings: Some(EarningsModule {
                earnings_chart: Some(EarningsChart {
                    quarterly: vec![
                        QuarterlyEps {
                            date: Some("3Q2023".to_string()),
                            actual: Some(YahooNumber {
                                raw: Some(1.46),
                                fmt: Some("1.46".to_string()),
                            }),
                        },
                        QuarterlyEps {
                            date: Some("4Q2023".to_string()),
                            actual: Some(YahooNumber::default()),
                        },
                        QuarterlyEps {
                            date: None,
                            actual: None,
                        },
                    ],
                }),
            }),
            ..QuoteSummaryResult::default()
        };

        let f = Fundamentals::from_quote_summary(result);
        assert_eq!(f.sector, "Technology");
        assert_eq!(f.industry, "N/A");
        assert_eq!(f.description, "N/A");
        assert!(f.financials.income_statement.is_empty());
        assert_eq!(f.earnings.len(), 2);
        assert_eq!(f.earnings[0].eps_actual, Some(1.46));
        assert_eq!(f.earnings[0].kind, "Historical");
        assert_eq!(f.earnings[1].eps_actual, None);
    }

    #[test]
    fn unavailable_reports_placeholders() {
        let f = Fundamentals::unavailable();
        assert_eq!(f.sector, "N/A");
        assert_eq!(f.financials, Financials::default());
        assert!(f.earnings.is_empty());
    }
}
