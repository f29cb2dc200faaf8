//! RedGifs media host adapter.
//!
//! Authenticates with the client-credentials grant and imports media by URL.
//! Credentials and endpoints are read from a fresh config snapshot on every
//! call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reelcast_common::{Error, Result};
use serde::{Deserialize, Serialize};

use super::token::{Clock, SystemClock, TokenCache};
use super::{build_client, status_message, transport_message, MediaHost, TokenResponse};
use crate::config::{ConfigStore, MediaHostConfig};
use crate::content::MAX_HOST_TAGS;

pub const PLATFORM: &str = "redgifs";

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    url: &'a str,
    title: &'a str,
    tags: &'a [String],
    keep_audio: bool,
    private: bool,
}

#[derive(Debug, Deserialize)]
struct ImportResponse {
    id: Option<String>,
    url: Option<String>,
}

#[derive(Debug)]
pub struct RedgifsClient {
    client: reqwest::Client,
    config: Arc<ConfigStore>,
    tokens: TokenCache,
}

impl RedgifsClient {
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build with an injected clock for token expiry.
    pub fn with_clock(config: Arc<ConfigStore>, clock: Arc<dyn Clock>) -> Self {
        let timeout = Duration::from_secs(config.snapshot().media_host.timeout_secs);
        Self {
            client: build_client(timeout),
            config,
            tokens: TokenCache::new(clock),
        }
    }

    /// Cached token, or a fresh one from the token endpoint.
    async fn access_token(&self, cfg: &MediaHostConfig) -> Result<String> {
        if let Some(token) = self.tokens.current() {
            return Ok(token);
        }

        let (Some(client_id), Some(client_secret)) =
            (cfg.client_id.as_deref(), cfg.client_secret.as_deref())
        else {
            return Err(Error::authentication(
                PLATFORM,
                "client credentials are not configured",
            ));
        };

        let url = format!("{}/v2/oauth/client", cfg.api_base.trim_end_matches('/'));
        tracing::debug!(platform = PLATFORM, "Requesting access token");

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
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
impl MediaHost for RedgifsClient {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    async fn host(&self, source_url: &str, title: &str, tags: &[String]) -> Result<String> {
        let cfg = self.config.snapshot().media_host;
        let token = self.access_token(&cfg).await?;

        let tags = &tags[..tags.len().min(MAX_HOST_TAGS)];
        let request = ImportRequest {
            url: source_url,
            title,
            tags,
            keep_audio: cfg.keep_audio,
            private: false,
        };

        let url = format!("{}/v2/gifs/import", cfg.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .bearer_auth(&token)
            .json(&request)
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

        let body: ImportResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(PLATFORM, transport_message(&e)))?;

        let hosted = match (
            body.url.filter(|u| !u.trim().is_empty()),
            body.id.filter(|i| !i.trim().is_empty()),
        ) {
            (Some(url), _) => url,
            (None, Some(id)) => format!("{}/{}", cfg.watch_base.trim_end_matches('/'), id),
            (None, None) => {
                return Err(Error::upstream(
                    PLATFORM,
                    "response did not include a media id",
                ))
            }
        };

        tracing::info!(platform = PLATFORM, url = %hosted, "Media hosted");
        Ok(hosted)
    }
}
