//! Status and mode types shared by the store and the orchestrator.
//!
//! All enums serialize in snake_case, which is also the text stored in the
//! database.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Upload registered but not yet usable.
    Pending,
    /// Stored and ready for distribution.
    Ready,
    /// Upload or processing failed.
    Failed,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

/// State of a post as it moves through the distribution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Both stages are automatic; waiting for the detached run to pick it up.
    Queued,
    /// Waiting for a human to host the media and report the URL.
    AwaitingMediaHostUrl,
    /// Waiting for a human to submit the link and report the post URL.
    AwaitingSocialPost,
    /// The media host adapter is running.
    UploadingMedia,
    /// The social adapter is running.
    PostingSocial,
    /// Terminal: the link is live on the social platform.
    Posted,
    /// Terminal: a stage failed; see the post's error message.
    Failed,
}

impl PostStatus {
    /// Every status, in pipeline order.
    pub const ALL: [PostStatus; 7] = [
        PostStatus::Queued,
        PostStatus::AwaitingMediaHostUrl,
        PostStatus::AwaitingSocialPost,
        PostStatus::UploadingMedia,
        PostStatus::PostingSocial,
        PostStatus::Posted,
        PostStatus::Failed,
    ];

    /// Status a freshly created post starts in for the given modes.
    pub fn initial_for(modes: PublishModes) -> Self {
        match (modes.media_host, modes.social) {
            (StageMode::Manual, _) => Self::AwaitingMediaHostUrl,
            (StageMode::Auto, StageMode::Manual) => Self::AwaitingSocialPost,
            (StageMode::Auto, StageMode::Auto) => Self::Queued,
        }
    }

    /// Whether the transition table allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        use PostStatus::*;
        matches!(
            (self, next),
            (Queued, UploadingMedia)
                | (UploadingMedia, PostingSocial)
                | (UploadingMedia, Failed)
                | (PostingSocial, Posted)
                | (PostingSocial, Failed)
                | (AwaitingMediaHostUrl, AwaitingSocialPost)
                | (AwaitingSocialPost, Posted)
                | (AwaitingSocialPost, PostingSocial)
        )
    }

    /// True once no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Posted | Self::Failed)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::AwaitingMediaHostUrl => write!(f, "awaiting_media_host_url"),
            Self::AwaitingSocialPost => write!(f, "awaiting_social_post"),
            Self::UploadingMedia => write!(f, "uploading_media"),
            Self::PostingSocial => write!(f, "posting_social"),
            Self::Posted => write!(f, "posted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostStatus::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| format!("Invalid post status: {}", s))
    }
}

/// Whether a platform stage runs unattended or waits for a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageMode {
    /// Credentials are configured; the adapter runs the stage.
    Auto,
    /// A human performs the stage and reports the resulting URL.
    Manual,
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Per-platform mode verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishModes {
    pub media_host: StageMode,
    pub social: StageMode,
}

impl PublishModes {
    /// Overall mode: auto only when every stage is auto.
    pub fn overall(&self) -> StageMode {
        if self.media_host == StageMode::Auto && self.social == StageMode::Auto {
            StageMode::Auto
        } else {
            StageMode::Manual
        }
    }
}
