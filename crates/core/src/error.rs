use thiserror::Error;

/// Failure reported by a market-data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Ticker {ticker} not found.")]
    NotFound { ticker: String },

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Ticker {ticker} not found.")]
    NotFound { ticker: String },

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound { ticker } => AnalysisError::NotFound { ticker },
            ProviderError::Upstream(e) => AnalysisError::Upstream(e),
        }
    }
}

/// Raised when an engine input document lacks a required field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("missing or non-numeric field: {0}")]
    MissingField(String),
}
