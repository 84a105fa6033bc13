use crate::config::Settings;
use crate::domain::sentiment::{ScoredPost, SentimentSummary};
use crate::sentiment::lexicon::{LexiconScorer, TextScorer};
use crate::sentiment::{summarize, SentimentProvider};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE_URL: &str = "https://oauth.reddit.com";
const PERMALINK_BASE: &str = "https://reddit.com";

pub const DEFAULT_SUBREDDITS: &[&str] = &["stocks", "investing", "wallstreetbets"];

const SEARCH_WINDOW: &str = "week";
const SEARCH_LIMIT: &str = "50";

// Refresh the token this long before Reddit says it expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: RedditPost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPost {
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
}

/// Searches a fixed set of subreddits for recent posts mentioning a ticker and
/// scores them with a [`TextScorer`].
pub struct RedditSentimentProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    api_base_url: String,
    subreddits: Vec<String>,
    scorer: Arc<dyn TextScorer>,

    // Application-only token shared by all requests in this process.
    token_cache: tokio::sync::Mutex<Option<CachedToken>>,
}

impl RedditSentimentProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let (client_id, client_secret) = settings.require_reddit_credentials()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.reddit_user_agent)
                .context("REDDIT_USER_AGENT is not a valid header value")?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.reddit_timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build reddit http client")?;

        Ok(Self {
            http,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_url: AUTH_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            scorer: Arc::new(LexiconScorer::new()),
            token_cache: tokio::sync::Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token_cache.lock().await;
        let now = Utc::now();
        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(now) {
                return Ok(cached.access_token.clone());
            }
        }

        let res = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("reddit token request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read reddit token response")?;
        if !status.is_success() {
            anyhow::bail!("reddit token HTTP {status}: {text}");
        }

        let token = serde_json::from_str::<TokenResponse>(&text)
            .context("failed to parse reddit token response")?;

        tracing::debug!(expires_in = token.expires_in, "issued reddit access token");

        let cached = CachedToken {
            access_token: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        };
        let access_token = cached.access_token.clone();
        *guard = Some(cached);
        Ok(access_token)
    }

    async fn search_subreddit(
        &self,
        token: &str,
        subreddit: &str,
        ticker: &str,
    ) -> Result<Vec<RedditPost>> {
        let url = format!(
            "{}/r/{}/search",
            self.api_base_url.trim_end_matches('/'),
            subreddit
        );

        let res = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("q", ticker),
                ("restrict_sr", "1"),
                ("t", SEARCH_WINDOW),
                ("limit", SEARCH_LIMIT),
                ("raw_json", "1"),
            ])
            .send()
            .await
            .with_context(|| format!("reddit search request failed for r/{subreddit}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read reddit search response")?;
        if !status.is_success() {
            anyhow::bail!("reddit search HTTP {status} for r/{subreddit}: {text}");
        }

        let listing = serde_json::from_str::<Listing>(&text)
            .with_context(|| format!("reddit search response for r/{subreddit} is not a listing"))?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }
}

#[async_trait::async_trait]
impl SentimentProvider for RedditSentimentProvider {
    fn provider_name(&self) -> &'static str {
        "reddit"
    }

    async fn sentiment(&self, ticker: &str) -> Result<SentimentSummary> {
        let token = self.access_token().await?;

        let mut scored = Vec::new();
        for subreddit in &self.subreddits {
            match self.search_subreddit(&token, subreddit, ticker).await {
                Ok(posts) => {
                    scored.extend(score_relevant_posts(ticker, posts, self.scorer.as_ref()));
                }
                Err(err) => {
                    tracing::warn!(%subreddit, %ticker, error = %err, "subreddit search failed; skipping");
                }
            }
        }

        tracing::debug!(%ticker, posts = scored.len(), "scored reddit posts");
        Ok(summarize(ticker, scored))
    }
}

/// Keeps posts that actually mention the ticker and scores their text.
pub fn score_relevant_posts(
    ticker: &str,
    posts: Vec<RedditPost>,
    scorer: &dyn TextScorer,
) -> Vec<ScoredPost> {
    let needle = ticker.to_lowercase();
    posts
        .into_iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle) || p.selftext.to_lowercase().contains(&needle)
        })
        .map(|p| {
            let sentiment = scorer.score(&format!("{} {}", p.title, p.selftext));
            ScoredPost {
                url: format!("{PERMALINK_BASE}{}", p.permalink),
                title: p.title,
                sentiment,
                score: p.score,
            }
        })
        .collect()
}
