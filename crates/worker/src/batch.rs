use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;
use stocksense_core::analysis::{Analyzer, StockAnalysis};
use stocksense_core::domain::contract::EngineInput;
use stocksense_core::domain::recommendation::Recommendation;
use tokio::task::JoinSet;

pub const MAX_CONCURRENCY: usize = 16;

/// Trims, upper-cases and de-duplicates tickers, keeping first-seen order.
pub fn normalize_tickers(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub ticker: String,
    pub result: Result<StockAnalysis, String>,
}

/// Analyses every ticker with at most `concurrency` requests in flight.
/// Outcomes come back in input order.
pub async fn analyze_all(
    analyzer: Arc<Analyzer>,
    tickers: Vec<String>,
    concurrency: usize,
) -> anyhow::Result<Vec<BatchOutcome>> {
    anyhow::ensure!(
        (1..=MAX_CONCURRENCY).contains(&concurrency),
        "concurrency must be 1..={MAX_CONCURRENCY} (got {concurrency})"
    );

    let total = tickers.len();
    let mut slots: Vec<Option<BatchOutcome>> = (0..total).map(|_| None).collect();
    let mut pending = tickers.into_iter().enumerate();
    let mut set = JoinSet::new();

    loop {
        while set.len() < concurrency {
            let Some((idx, ticker)) = pending.next() else {
                break;
            };
            let analyzer = analyzer.clone();
            set.spawn(async move {
                let result = analyzer.analyze(&ticker).await.map_err(|e| format!("{e:#}"));
                (idx, BatchOutcome { ticker, result })
            });
        }

        let Some(joined) = set.join_next().await else {
            break;
        };
        let (idx, outcome) = joined.context("analysis task panicked")?;
        if let Err(err) = &outcome.result {
            tracing::warn!(ticker = %outcome.ticker, error = %err, "analysis failed");
        }
        slots[idx] = Some(outcome);
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Scores a saved `{stock_data, sentiment_data}` document without any network access.
pub fn score_document(text: &str) -> anyhow::Result<Recommendation> {
    let doc: serde_json::Value =
        serde_json::from_str(text).context("input is not valid JSON")?;
    let input = EngineInput::from_json(&doc)?;
    Ok(input.recommend())
}
