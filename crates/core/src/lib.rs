pub mod analysis;
pub mod domain;
pub mod engine;
pub mod error;
pub mod market;
pub mod sentiment;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
    pub const DEFAULT_REDDIT_USER_AGENT: &str = "stock-sentiment-bot/1.0";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub sentry_dsn: Option<String>,
        pub yahoo_base_url: String,
        pub market_data_timeout_secs: u64,
        pub reddit_client_id: Option<String>,
        pub reddit_client_secret: Option<String>,
        pub reddit_user_agent: String,
        pub reddit_timeout_secs: u64,
        pub sentiment_mock: bool,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                port: 8000,
                sentry_dsn: None,
                yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
                market_data_timeout_secs: 30,
                reddit_client_id: None,
                reddit_client_secret: None,
                reddit_user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
                reddit_timeout_secs: 30,
                sentiment_mock: false,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();
            Ok(Self {
                port: parse_env("PORT")?.unwrap_or(defaults.port),
                sentry_dsn: non_empty_env("SENTRY_DSN"),
                yahoo_base_url: non_empty_env("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
                market_data_timeout_secs: parse_env("MARKET_DATA_TIMEOUT_SECS")?
                    .unwrap_or(defaults.market_data_timeout_secs),
                reddit_client_id: non_empty_env("REDDIT_CLIENT_ID"),
                reddit_client_secret: non_empty_env("REDDIT_CLIENT_SECRET"),
                reddit_user_agent: non_empty_env("REDDIT_USER_AGENT")
                    .unwrap_or(defaults.reddit_user_agent),
                reddit_timeout_secs: parse_env("REDDIT_TIMEOUT_SECS")?
                    .unwrap_or(defaults.reddit_timeout_secs),
                sentiment_mock: parse_flag(std::env::var("SENTIMENT_MOCK").ok().as_deref()),
            })
        }

        pub fn require_reddit_credentials(&self) -> anyhow::Result<(&str, &str)> {
            let id = self
                .reddit_client_id
                .as_deref()
                .context("REDDIT_CLIENT_ID is required")?;
            let secret = self
                .reddit_client_secret
                .as_deref()
                .context("REDDIT_CLIENT_SECRET is required")?;
            Ok((id, secret))
        }

        pub fn has_reddit_credentials(&self) -> bool {
            self.reddit_client_id.is_some() && self.reddit_client_secret.is_some()
        }
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn parse_env<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_env(key)
            .map(|s| s.trim().parse::<T>())
            .transpose()
            .with_context(|| format!("{key} is not valid"))
    }

    fn parse_flag(value: Option<&str>) -> bool {
        matches!(
            value.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
            Some("1" | "true" | "yes" | "on")
        )
    }

}
