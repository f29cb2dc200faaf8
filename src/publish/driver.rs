//! Detached auto-mode runs.
//!
//! A run owns no state of its own. Every step is a guarded status write, so
//! a run that loses a race (or hits a store error) simply stops. Each run is
//! supervised: if it dies mid-stage, the post is failed from whatever status
//! was last persisted.

use std::future::Future;
use std::sync::Arc;

use reelcast_common::{AssetId, Error, PostId, PostStatus, Result};

use super::urls::source_url;
use crate::catalog::Catalog;
use crate::config::ConfigStore;
use crate::platforms::{MediaHost, SocialPlatform};

/// Everything a detached run needs.
#[derive(Clone)]
pub(crate) struct Pipeline {
    pub catalog: Arc<dyn Catalog>,
    pub config: Arc<ConfigStore>,
    pub media_host: Arc<dyn MediaHost>,
    pub social: Arc<dyn SocialPlatform>,
}

/// Recorded on a post whose run died before reporting an outcome.
const ABORTED_RUN: &str = "publish run aborted unexpectedly";

/// What the social stage submits.
#[derive(Debug, Clone)]
pub(crate) struct Submission {
    pub channel: String,
    pub title: String,
    pub sensitive: bool,
}

impl Pipeline {
    /// Run `leg` on its own task and fail the post if the task dies.
    pub async fn supervise<F>(&self, post_id: PostId, leg: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Err(e) = tokio::spawn(leg).await else {
            return;
        };
        tracing::error!(post_id = %post_id, error = %e, "Publish run aborted");

        let post = match self.catalog.get_post(post_id) {
            Ok(post) => post,
            Err(e) => {
                tracing::error!(
                    post_id = %post_id,
                    error = %e,
                    "Failed to read post after aborted run"
                );
                return;
            }
        };
        if post.status.can_transition_to(PostStatus::Failed) {
            self.advance(
                post_id,
                PostStatus::Failed,
                self.catalog.fail_post(post_id, post.status, ABORTED_RUN),
            );
        }
    }

    /// Drive a `queued` post through hosting and posting.
    pub async fn run_full(
        &self,
        post_id: PostId,
        asset_id: AssetId,
        submission: Submission,
        host_tags: Vec<String>,
    ) {
        if !self.advance(
            post_id,
            PostStatus::UploadingMedia,
            self.catalog
                .transition_post(post_id, PostStatus::Queued, PostStatus::UploadingMedia),
        ) {
            return;
        }

        let hosted = match self.hosted_url(asset_id, &submission.title, &host_tags).await {
            Ok(url) => url,
            Err(HostingError::Stage(e)) => {
                self.fail(post_id, PostStatus::UploadingMedia, &e);
                return;
            }
            Err(HostingError::Store(e)) => {
                tracing::error!(
                    post_id = %post_id,
                    asset_id = %asset_id,
                    error = %e,
                    "Failed to record media host URL; abandoning run"
                );
                return;
            }
        };

        if !self.advance(
            post_id,
            PostStatus::PostingSocial,
            self.catalog.transition_post(
                post_id,
                PostStatus::UploadingMedia,
                PostStatus::PostingSocial,
            ),
        ) {
            return;
        }

        self.run_social(post_id, submission, hosted).await;
    }

    /// Submit a `posting_social` post and record the result.
    pub async fn run_social(&self, post_id: PostId, submission: Submission, hosted_url: String) {
        let result = self
            .social
            .post(
                &submission.channel,
                &submission.title,
                &hosted_url,
                submission.sensitive,
            )
            .await;

        match result {
            Ok(post_url) => {
                self.advance(
                    post_id,
                    PostStatus::Posted,
                    self.catalog
                        .complete_post(post_id, PostStatus::PostingSocial, &post_url),
                );
            }
            Err(e) => self.fail(post_id, PostStatus::PostingSocial, &e),
        }
    }

    /// Cached media host URL, or a fresh one from the adapter.
    async fn hosted_url(
        &self,
        asset_id: AssetId,
        title: &str,
        host_tags: &[String],
    ) -> std::result::Result<String, HostingError> {
        // Re-read so a URL cached since publish() is picked up
        let asset = self.catalog.get_asset(asset_id).map_err(HostingError::Store)?;
        if let Some(url) = asset.media_host_url {
            tracing::debug!(asset_id = %asset_id, url = %url, "Using cached media host URL");
            return Ok(url);
        }

        let config = self.config.snapshot();
        let source = source_url(&asset.storage_key, config.storage.public_base_url.as_deref())
            .map_err(HostingError::Stage)?;

        tracing::info!(
            asset_id = %asset_id,
            platform = self.media_host.name(),
            source = %source,
            "Hosting media"
        );
        let hosted = self
            .media_host
            .host(&source, title, host_tags)
            .await
            .map_err(HostingError::Stage)?;

        let stored = self
            .catalog
            .cache_media_host_url(asset_id, &hosted)
            .map_err(HostingError::Store)?;
        if !stored {
            tracing::debug!(
                asset_id = %asset_id,
                "Media host URL was cached by another run; keeping the first"
            );
        }

        Ok(hosted)
    }

    /// Apply a guarded status write. Returns whether the run may continue.
    fn advance(&self, post_id: PostId, to: PostStatus, result: Result<bool>) -> bool {
        match result {
            Ok(true) => {
                tracing::info!(post_id = %post_id, status = %to, "Post status updated");
                true
            }
            Ok(false) => {
                tracing::warn!(
                    post_id = %post_id,
                    status = %to,
                    "Post left the expected state; stopping run"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    post_id = %post_id,
                    status = %to,
                    error = %e,
                    "Failed to persist post status; abandoning run"
                );
                false
            }
        }
    }

    fn fail(&self, post_id: PostId, from: PostStatus, error: &Error) {
        tracing::warn!(post_id = %post_id, stage = %from, error = %error, "Publish stage failed");
        self.advance(
            post_id,
            PostStatus::Failed,
            self.catalog.fail_post(post_id, from, &error.detail()),
        );
    }
}

enum HostingError {
    /// The stage failed; the post is marked failed.
    Stage(Error),
    /// The store failed; the run is abandoned.
    Store(Error),
}
