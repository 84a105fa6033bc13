use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stocksense_core::analysis::Analyzer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "stocksense_worker")]
struct Args {
    /// Ticker to analyse. Repeat the flag or pass a comma-separated list.
    #[arg(long = "ticker", required_unless_present = "input", conflicts_with = "input")]
    tickers: Vec<String>,

    /// Score a saved `{stock_data, sentiment_data}` JSON document offline.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Tickers analysed at the same time.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    // stdout carries the JSON results.
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    // Offline scoring needs no settings.
    if let Some(path) = args.input.as_deref() {
        println!("{}", score_file(path)?);
        return Ok(());
    }

    let settings = stocksense_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    let tickers = batch::normalize_tickers(&args.tickers);
    anyhow::ensure!(!tickers.is_empty(), "no tickers given");

    let analyzer = match Analyzer::from_settings(&settings) {
        Ok(analyzer) => Arc::new(analyzer),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "failed to build analysis providers");
            return Err(e);
        }
    };

    let total = tickers.len();
    tracing::info!(total, concurrency = args.concurrency, "batch analysis started");

    let outcomes = batch::analyze_all(analyzer, tickers, args.concurrency).await?;

    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(analysis) => println!("{}", serde_json::to_string(&analysis)?),
            Err(err) => {
                sentry::capture_message(
                    &format!("analysis failed for {}: {err}", outcome.ticker),
                    sentry::Level::Error,
                );
                failed.push(outcome.ticker);
            }
        }
    }

    tracing::info!(total, failed = failed.len(), "batch analysis finished");

    if !failed.is_empty() {
        anyhow::bail!("analysis failed for {}", failed.join(", "));
    }

    Ok(())
}

fn score_file(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {} failed", path.display()))?;
    let recommendation = batch::score_document(&text)?;
    Ok(serde_json::to_string(&recommendation)?)
}

fn init_sentry(settings: &stocksense_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
