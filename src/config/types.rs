use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub media_host: MediaHostConfig,

    #[serde(default)]
    pub social: SocialConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file; relative paths resolve against the working directory
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reelcast.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Public base URL that storage keys are joined onto, so the media host
    /// can fetch the file (e.g. "https://cdn.example.com/uploads")
    #[serde(default)]
    pub public_base_url: Option<String>,
}

/// Media host (RedGifs) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaHostConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_media_api_base")]
    pub api_base: String,

    /// Prefix for watch URLs built from a returned media id
    #[serde(default = "default_watch_base")]
    pub watch_base: String,

    /// Domain that manually supplied media-host URLs must belong to
    #[serde(default = "default_media_domain")]
    pub domain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Keep the audio track when importing
    #[serde(default = "default_true")]
    pub keep_audio: bool,
}

fn default_media_api_base() -> String {
    "https://api.redgifs.com".to_string()
}
fn default_watch_base() -> String {
    "https://www.redgifs.com/watch".to_string()
}
fn default_media_domain() -> String {
    "redgifs.com".to_string()
}

impl Default for MediaHostConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            api_base: default_media_api_base(),
            watch_base: default_watch_base(),
            domain: default_media_domain(),
            timeout_secs: default_timeout_secs(),
            keep_audio: true,
        }
    }
}

/// Social platform (Reddit) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SocialConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL for the token endpoint
    #[serde(default = "default_social_auth_base")]
    pub auth_base: String,

    /// Base URL for authenticated API calls
    #[serde(default = "default_social_api_base")]
    pub api_base: String,

    /// Domain that manually supplied post URLs must belong to
    #[serde(default = "default_social_domain")]
    pub domain: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!("reelcast/{}", env!("CARGO_PKG_VERSION"))
}
fn default_social_auth_base() -> String {
    "https://www.reddit.com".to_string()
}
fn default_social_api_base() -> String {
    "https://oauth.reddit.com".to_string()
}
fn default_social_domain() -> String {
    "reddit.com".to_string()
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            username: None,
            password: None,
            user_agent: default_user_agent(),
            auth_base: default_social_auth_base(),
            api_base: default_social_api_base(),
            domain: default_social_domain(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// Content tag registry overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Replaces the built-in fallback title
    #[serde(default)]
    pub fallback_title: Option<String>,

    /// Replaces the built-in fallback channel
    #[serde(default)]
    pub fallback_channel: Option<String>,

    /// Added to (or replacing) the built-in tag entries
    #[serde(default)]
    pub tags: Vec<TagConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagConfig {
    pub name: String,

    #[serde(default)]
    pub titles: Vec<String>,

    #[serde(default)]
    pub channels: Vec<String>,

    /// Tags forwarded to the media host
    #[serde(default)]
    pub host_tags: Vec<String>,

    #[serde(default = "default_true")]
    pub sensitive: bool,
}
