//! Publish orchestration.
//!
//! [`Publisher`] creates posts, decides their starting state from the current
//! mode verdict, and hands auto-mode work to detached tasks. The manual
//! resume operations let an operator report URLs produced by hand.
//!
//! ```text
//! publish ──► queued ──► uploading_media ──► posting_social ──► posted
//!   │                          │                  ▲   │
//!   │                          └──► failed ◄──────┼───┘
//!   ├──► awaiting_media_host_url ──► awaiting_social_post ──► posted
//!   └──► awaiting_social_post ────────────┘   (social auto: ──► posting_social)
//! ```

mod driver;
pub mod urls;

use std::future::Future;
use std::sync::Arc;

use reelcast_common::{AssetId, AssetStatus, Error, PostId, PostStatus, PublishModes, Result, StageMode};
use reelcast_db::models::{NewPost, Post};
use serde::{Deserialize, Serialize};
use tokio_util::task::TaskTracker;

use self::driver::{Pipeline, Submission};
use self::urls::validate_platform_url;
use crate::catalog::Catalog;
use crate::config::ConfigStore;
use crate::content::ContentCatalog;
use crate::mode::resolve_modes;
use crate::platforms::{MediaHost, RedditClient, RedgifsClient, SocialPlatform};

/// What the operator has to do next for a manual post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    SupplyMediaHostUrl,
    SupplySocialPostUrl,
}

/// Result of [`Publisher::publish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub post_id: PostId,
    pub status: PostStatus,
    pub title: String,
    pub channel: String,
    /// `auto` only when both stages are auto.
    pub mode: StageMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<NextStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything a human needs to create the social post by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPackage {
    pub title: String,
    pub url: String,
    pub channel: String,
    pub sensitive: bool,
}

/// Result of [`Publisher::supply_media_host_url`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaHostSupplied {
    pub post_id: PostId,
    pub status: PostStatus,
    pub package: PostPackage,
    /// True when the social stage was handed to a detached run.
    pub resumed: bool,
}

/// Result of [`Publisher::supply_social_post_url`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPostSupplied {
    pub post_id: PostId,
    pub status: PostStatus,
    pub post_url: String,
}

pub struct Publisher {
    pipeline: Pipeline,
    tasks: TaskTracker,
}

impl Publisher {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        config: Arc<ConfigStore>,
        media_host: Arc<dyn MediaHost>,
        social: Arc<dyn SocialPlatform>,
    ) -> Self {
        Self {
            pipeline: Pipeline {
                catalog,
                config,
                media_host,
                social,
            },
            tasks: TaskTracker::new(),
        }
    }

    /// Publisher wired to the RedGifs and Reddit adapters.
    pub fn with_default_platforms(catalog: Arc<dyn Catalog>, config: Arc<ConfigStore>) -> Self {
        let media_host = Arc::new(RedgifsClient::new(config.clone()));
        let social = Arc::new(RedditClient::new(config.clone()));
        Self::new(catalog, config, media_host, social)
    }

    /// Current mode verdict.
    pub fn get_mode(&self) -> PublishModes {
        resolve_modes(&self.pipeline.config.snapshot())
    }

    /// Create a post for an asset and start whatever can run unattended.
    ///
    /// Returns once the post is persisted. In auto mode the hosting and
    /// posting stages continue on a detached task.
    pub async fn publish(
        &self,
        asset_id: AssetId,
        channel_override: Option<&str>,
    ) -> Result<PublishOutcome> {
        let config = self.pipeline.config.snapshot();
        let modes = resolve_modes(&config);

        let asset = self.pipeline.catalog.get_asset(asset_id)?;
        if asset.status != AssetStatus::Ready {
            return Err(Error::invalid_state(format!(
                "asset {} is {}; only ready assets can be published",
                asset_id, asset.status
            )));
        }

        let plan = ContentCatalog::from_config(&config.content)
            .plan(&asset.content_tag, channel_override);
        let status = PostStatus::initial_for(modes);

        let post = self.pipeline.catalog.create_post(&NewPost {
            asset_id,
            platform: self.pipeline.social.name().to_string(),
            channel: plan.channel.clone(),
            title: plan.title.clone(),
            sensitive: plan.sensitive,
            status,
        })?;

        tracing::info!(
            post_id = %post.id,
            asset_id = %asset_id,
            status = %status,
            channel = %post.channel,
            media_host_mode = %modes.media_host,
            social_mode = %modes.social,
            "Post created"
        );

        let (next_step, message) = match status {
            PostStatus::Queued => {
                let pipeline = self.pipeline.clone();
                let submission = Submission {
                    channel: plan.channel.clone(),
                    title: plan.title.clone(),
                    sensitive: plan.sensitive,
                };
                let post_id = post.id;
                let host_tags = plan.host_tags.clone();
                self.spawn_run(post_id, async move {
                    pipeline
                        .run_full(post_id, asset_id, submission, host_tags)
                        .await;
                });
                (None, None)
            }
            PostStatus::AwaitingMediaHostUrl => {
                let message = match asset.media_host_url.as_deref() {
                    Some(url) => format!(
                        "Media host credentials are not configured. This asset is already hosted at {}; supply that URL to continue.",
                        url
                    ),
                    None => format!(
                        "Media host credentials are not configured. Upload the video to {} and supply the resulting URL.",
                        config.media_host.domain
                    ),
                };
                (Some(NextStep::SupplyMediaHostUrl), Some(message))
            }
            PostStatus::AwaitingSocialPost => {
                let message = match asset.media_host_url.as_deref() {
                    Some(url) => format!(
                        "Social credentials are not configured. Post {} to {} by hand and supply the post URL.",
                        url, plan.channel
                    ),
                    None => format!(
                        "Social credentials are not configured. Post the video to {} by hand and supply the post URL.",
                        plan.channel
                    ),
                };
                (Some(NextStep::SupplySocialPostUrl), Some(message))
            }
            other => {
                return Err(Error::invalid_state(format!(
                    "post {} was created as {}",
                    post.id, other
                )))
            }
        };

        Ok(PublishOutcome {
            post_id: post.id,
            status,
            title: plan.title,
            channel: plan.channel,
            mode: modes.overall(),
            next_step,
            message,
        })
    }

    pub fn list_posts(&self) -> Result<Vec<Post>> {
        self.pipeline.catalog.list_posts()
    }

    pub fn get_post(&self, post_id: PostId) -> Result<Post> {
        self.pipeline.catalog.get_post(post_id)
    }

    /// Posts for an asset, newest first. Unknown assets are NotFound.
    pub fn list_posts_for_asset(&self, asset_id: AssetId) -> Result<Vec<Post>> {
        self.pipeline.catalog.get_asset(asset_id)?;
        self.pipeline.catalog.list_posts_for_asset(asset_id)
    }

    /// Report the URL of media hosted by hand.
    ///
    /// If the asset already has a cached media host URL, that URL wins and is
    /// the one placed in the package. When the social stage resolves to auto
    /// the post moves on to `posting_social` and is submitted in the
    /// background.
    ///
    /// The post is advanced before the asset is touched, so a rejected call
    /// leaves both unchanged.
    pub async fn supply_media_host_url(
        &self,
        post_id: PostId,
        url: &str,
    ) -> Result<MediaHostSupplied> {
        let catalog = &self.pipeline.catalog;
        let post = catalog.get_post(post_id)?;
        expect_status(&post, PostStatus::AwaitingMediaHostUrl)?;

        let config = self.pipeline.config.snapshot();
        let supplied = validate_platform_url(url, &config.media_host.domain, "media host URL")?;

        if !catalog.transition_post(
            post_id,
            PostStatus::AwaitingMediaHostUrl,
            PostStatus::AwaitingSocialPost,
        )? {
            return Err(changed_underneath(post_id));
        }

        let hosted = if catalog.cache_media_host_url(post.asset_id, &supplied)? {
            supplied
        } else {
            let cached = catalog
                .get_asset(post.asset_id)?
                .media_host_url
                .unwrap_or(supplied.clone());
            if cached != supplied {
                tracing::warn!(
                    post_id = %post_id,
                    asset_id = %post.asset_id,
                    supplied = %supplied,
                    cached = %cached,
                    "Asset already has a media host URL; using the cached one"
                );
            }
            cached
        };
        tracing::info!(post_id = %post_id, status = %PostStatus::AwaitingSocialPost, "Media host URL supplied");

        let package = PostPackage {
            title: post.title.clone(),
            url: hosted.clone(),
            channel: post.channel.clone(),
            sensitive: post.sensitive,
        };

        let social_auto = resolve_modes(&config).social == StageMode::Auto;
        let resumed = social_auto
            && catalog.transition_post(
                post_id,
                PostStatus::AwaitingSocialPost,
                PostStatus::PostingSocial,
            )?;

        let status = if resumed {
            tracing::info!(post_id = %post_id, status = %PostStatus::PostingSocial, "Resuming social stage");
            let pipeline = self.pipeline.clone();
            let submission = Submission {
                channel: post.channel,
                title: post.title,
                sensitive: post.sensitive,
            };
            self.spawn_run(post_id, async move {
                pipeline.run_social(post_id, submission, hosted).await;
            });
            PostStatus::PostingSocial
        } else {
            PostStatus::AwaitingSocialPost
        };

        Ok(MediaHostSupplied {
            post_id,
            status,
            package,
            resumed,
        })
    }

    /// Report the URL of a social post made by hand.
    pub async fn supply_social_post_url(
        &self,
        post_id: PostId,
        url: &str,
    ) -> Result<SocialPostSupplied> {
        let catalog = &self.pipeline.catalog;
        let post = catalog.get_post(post_id)?;
        expect_status(&post, PostStatus::AwaitingSocialPost)?;

        let config = self.pipeline.config.snapshot();
        let post_url = validate_platform_url(url, &config.social.domain, "post URL")?;

        if !catalog.complete_post(post_id, PostStatus::AwaitingSocialPost, &post_url)? {
            return Err(changed_underneath(post_id));
        }
        tracing::info!(post_id = %post_id, status = %PostStatus::Posted, url = %post_url, "Post URL supplied");

        Ok(SocialPostSupplied {
            post_id,
            status: PostStatus::Posted,
            post_url,
        })
    }

    /// Track a detached run for `post_id`.
    fn spawn_run<F>(&self, post_id: PostId, leg: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let pipeline = self.pipeline.clone();
        self.tasks.spawn(async move {
            pipeline.supervise(post_id, leg).await;
        });
    }

    /// Wait for in-flight runs, leaving the publisher usable afterwards.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Wait for in-flight runs to record their final status.
    pub async fn shutdown(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            tracing::info!(runs = self.tasks.len(), "Waiting for publish runs to finish");
        }
        self.tasks.wait().await;
    }
}

fn expect_status(post: &Post, expected: PostStatus) -> Result<()> {
    if post.status == expected {
        Ok(())
    } else {
        Err(Error::invalid_state(format!(
            "post {} is {}; expected {}",
            post.id, post.status, expected
        )))
    }
}

fn changed_underneath(post_id: PostId) -> Error {
    Error::invalid_state(format!("post {} changed state concurrently", post_id))
}
