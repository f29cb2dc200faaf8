//! External platform adapters.
//!
//! One adapter per platform. Each owns its HTTP client and token cache and
//! exposes a single operation. Adapters never retry; a failed call is
//! reported once as [`Error::Authentication`] or [`Error::Upstream`].

pub mod reddit;
pub mod redgifs;
pub mod token;

pub use reddit::RedditClient;
pub use redgifs::RedgifsClient;
pub use token::{Clock, ManualClock, SystemClock, TokenCache};

use async_trait::async_trait;
use reelcast_common::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// TTL assumed when a token response omits `expires_in`.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// A service that ingests media and returns a shareable URL.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Short platform name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Host the media at `source_url`; returns the hosted URL.
    async fn host(&self, source_url: &str, title: &str, tags: &[String]) -> Result<String>;
}

/// A platform that accepts link submissions.
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Short platform name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Submit `url` to `channel`; returns the URL of the new post.
    async fn post(&self, channel: &str, title: &str, url: &str, sensitive: bool)
        -> Result<String>;
}

/// OAuth token response shared by both platforms.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    /// Split into token and TTL, or an authentication error.
    fn into_token(self, platform: &str) -> Result<(String, Duration)> {
        match self.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let ttl = self
                    .expires_in
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TOKEN_TTL);
                Ok((token, ttl))
            }
            None => {
                let message = match (self.error, self.error_description) {
                    (Some(e), Some(d)) => format!("{}: {}", e, d),
                    (Some(e), None) => e,
                    (None, Some(d)) => d,
                    (None, None) => "response did not include an access token".to_string(),
                };
                Err(Error::authentication(platform, message))
            }
        }
    }
}

/// Message for a failed HTTP exchange. Timeouts are reported as "timeout".
fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else {
        err.to_string()
    }
}

/// Build a client with a fixed per-request timeout.
fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout: {}", e);
            reqwest::Client::new()
        })
}

/// Read a non-success response into a "status: body" message.
async fn status_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}
