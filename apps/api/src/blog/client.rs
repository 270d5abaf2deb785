//! WordPress REST client. The only code in the service that talks to the CMS.
//!
//! Every call is Basic-authenticated, memoized through the injected
//! `ResponseCache`, retried on 429 and on network errors with exponential
//! backoff and bounded by an overall deadline.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::blog::cache::ResponseCache;
use crate::config::WordPressConfig;
use crate::retry::RetryPolicy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("CMS returned non-JSON content ({content_type})")]
    NotJson { content_type: String },

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("CMS call exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),
}

#[derive(Clone)]
pub struct WordPressClient {
    http: Client,
    base_url: String,
    username: String,
    app_password: String,
    cache: Arc<dyn ResponseCache>,
    policy: RetryPolicy,
}

impl WordPressClient {
    pub fn new(
        config: &WordPressConfig,
        cache: Arc<dyn ResponseCache>,
        policy: RetryPolicy,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            app_password: config.app_password.clone(),
            cache,
            policy,
        })
    }

    /// GETs `{base_url}{path_and_query}` and returns the parsed JSON body.
    /// The full URL is the cache key. The deadline covers the cache round
    /// trips as well as the upstream attempts.
    pub async fn fetch_json(&self, path_and_query: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        tokio::time::timeout(self.policy.deadline, self.fetch_cached(&url))
            .await
            .map_err(|_| FetchError::DeadlineExceeded(self.policy.deadline))?
    }

    async fn fetch_cached(&self, url: &str) -> Result<Value, FetchError> {
        if let Some(cached) = self.cache.get(url).await {
            debug!("CMS cache hit: {url}");
            return Ok(cached);
        }

        let body = self.fetch_with_backoff(url).await?;

        self.cache.put(url, body.clone()).await;
        debug!("CMS response cached for {:?}: {url}", self.cache.ttl());
        Ok(body)
    }

    /// Retries 429s and transient network errors, waiting
    /// `policy.delay_for(attempt)` after each one.
    async fn fetch_with_backoff(&self, url: &str) -> Result<Value, FetchError> {
        let mut last_error = None;

        for attempt in 0..self.policy.max_attempts {
            let delay = self.policy.delay_for(attempt);
            let sent = self
                .http
                .get(url)
                .basic_auth(&self.username, Some(&self.app_password))
                .header(ACCEPT, "application/json")
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) if is_transient(&e) => {
                    warn!(
                        "CMS request to {url} failed (attempt {}/{}), backing off {}ms: {e}",
                        attempt + 1,
                        self.policy.max_attempts,
                        delay.as_millis()
                    );
                    last_error = Some(FetchError::Http(e));
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(
                    "CMS rate limited {url} (attempt {}/{}), backing off {}ms",
                    attempt + 1,
                    self.policy.max_attempts,
                    delay.as_millis()
                );
                last_error = Some(FetchError::RateLimited {
                    attempts: self.policy.max_attempts,
                });
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            // WordPress behind a misconfigured proxy can answer 200 with an HTML error page
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            if !is_json_content_type(&content_type) {
                return Err(FetchError::NotJson { content_type });
            }

            return Ok(response.json::<Value>().await?);
        }

        Err(last_error.unwrap_or(FetchError::RateLimited {
            attempts: self.policy.max_attempts,
        }))
    }
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request()
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
