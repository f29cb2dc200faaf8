//! Reddit social adapter.
//!
//! Uses the password grant for a script app and submits link posts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelcast_common::{Error, Result};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use super::token::{Clock, SystemClock, TokenCache};
use super::{build_client, status_message, transport_message, SocialPlatform, TokenResponse};
use crate::config::{ConfigStore, SocialConfig};

pub const PLATFORM: &str = "reddit";

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    json: SubmitBody,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    url: Option<String>,
}

/// Render Reddit's `[code, message, field]` error triples.
fn describe_errors(errors: &[Vec<serde_json::Value>]) -> String {
    errors
        .iter()
        .map(|parts| {
            let parts: Vec<&str> = parts
                .iter()
                .take(2)
                .filter_map(|p| p.as_str())
                .filter(|p| !p.is_empty())
                .collect();
            parts.join(": ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug)]
pub struct RedditClient {
    client: reqwest::Client,
    config: Arc<ConfigStore>,
    tokens: TokenCache,
}

impl RedditClient {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Arc<ConfigStore>, clock: Arc<dyn Clock>) -> Self {
        let timeout = Duration::from_secs(config.snapshot().social.timeout_secs);
        Self {
            client: build_client(timeout),
            config,
            tokens: TokenCache::new(clock),
        }
    }

    async fn access_token(&self, cfg: &SocialConfig) -> Result<String> {
        if let Some(token) = self.tokens.current() {
            return Ok(token);
        }

        let (Some(client_id), Some(client_secret), Some(username), Some(password)) = (
            cfg.client_id.as_deref(),
            cfg.client_secret.as_deref(),
            cfg.username.as_deref(),
            cfg.password.as_deref(),
        ) else {
            return Err(Error::authentication(
                PLATFORM,
                "account credentials are not configured",
            ));
        };

        let url = format!("{}/api/v1/access_token", cfg.auth_base.trim_end_matches('/'));
        tracing::debug!(platform = PLATFORM, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .basic_auth(client_id, Some(client_secret))
            .header(USER_AGENT, &cfg.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await
            .map_err(|e| Error::authentication(PLATFORM, transport_message(&e)))?;

        if !response.status().is_success() {
            return Err(Error::authentication(
                PLATFORM,
                status_message(response).await,
            ));
        }

        // Bad passwords come back as 200 with an "error" field
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::authentication(PLATFORM, transport_message(&e)))?;
        let (token, ttl) = body.into_token(PLATFORM)?;

        tracing::debug!(
            platform = PLATFORM,
            ttl_secs = ttl.as_secs(),
            "Access token refreshed"
        );
        Ok(self.tokens.store(token, ttl))
    }
}

#[async_trait]
impl SocialPlatform for RedditClient {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    async fn post(
        &self,
        channel: &str,
        title: &str,
        url: &str,
        sensitive: bool,
    ) -> Result<String> {
        let cfg = self.config.snapshot().social;
        let token = self.access_token(&cfg).await?;

        let endpoint = format!("{}/api/submit", cfg.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&endpoint)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .bearer_auth(&token)
            .header(USER_AGENT, &cfg.user_agent)
            .form(&[
                ("sr", channel),
                ("kind", "link"),
                ("title", title),
                ("url", url),
                ("nsfw", if sensitive { "true" } else { "false" }),
                ("resubmit", "true"),
                ("api_type", "json"),
            ])
            .send()
            .await
            .map_err(|e| Error::upstream(PLATFORM, transport_message(&e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.tokens.clear();
            return Err(Error::authentication(
                PLATFORM,
                status_message(response).await,
            ));
        }
        if !status.is_success() {
            return Err(Error::upstream(PLATFORM, status_message(response).await));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(PLATFORM, transport_message(&e)))?;

        if !body.json.errors.is_empty() {
            return Err(Error::upstream(PLATFORM, describe_errors(&body.json.errors)));
        }

        let post_url = body
            .json
            .data
            .and_then(|d| d.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::upstream(PLATFORM, "response did not include a post URL"))?;

        tracing::info!(platform = PLATFORM, channel, url = %post_url, "Post submitted");
        Ok(post_url)
    }
}
