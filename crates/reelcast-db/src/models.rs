//! Database models for reelcast.
//!
//! These structs map one-to-one onto the `assets` and `posts` tables.

use chrono::{DateTime, Utc};
use reelcast_common::{AssetId, AssetStatus, PostId, PostStatus};
use serde::{Deserialize, Serialize};

/// An uploaded media item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    /// Locator in the file store; either a key or an absolute URL.
    pub storage_key: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Free-text tag used to pick a title and target channel.
    pub content_tag: String,
    pub status: AssetStatus,
    /// Set once the media host has ingested the file; never overwritten.
    pub media_host_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register an asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAsset {
    pub storage_key: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub content_tag: String,
    pub status: AssetStatus,
}

impl NewAsset {
    /// A ready-to-publish video asset with no content tag.
    pub fn ready(storage_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            display_name: display_name.into(),
            mime_type: "video/mp4".to_string(),
            size_bytes: 0,
            content_tag: String::new(),
            status: AssetStatus::Ready,
        }
    }

    /// Set the content tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.content_tag = tag.into();
        self
    }
}

/// One distribution attempt of an asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub asset_id: AssetId,
    pub platform: String,
    pub channel: String,
    pub title: String,
    /// Content flag passed to the social platform.
    pub sensitive: bool,
    pub post_url: Option<String>,
    pub status: PostStatus,
    /// Present if and only if `status` is `failed`.
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub asset_id: AssetId,
    pub platform: String,
    pub channel: String,
    pub title: String,
    pub sensitive: bool,
    pub status: PostStatus,
}
