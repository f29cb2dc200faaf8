//! Content generation: titles, target channels, and content flags derived
//! from an asset's content tag.
//!
//! Titles are drawn at random from the tag's candidates, so two publishes of
//! the same asset may differ. An unknown tag always maps to the fixed fallback
//! title and channel.

mod builtin;

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ContentConfig;

/// Media host accepts at most this many tags per upload.
pub const MAX_HOST_TAGS: usize = 5;

/// Registered content for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub titles: Vec<String>,
    pub channels: Vec<String>,
    pub host_tags: Vec<String>,
    pub sensitive: bool,
}

/// What to publish for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlan {
    pub title: String,
    pub channel: String,
    pub host_tags: Vec<String>,
    pub sensitive: bool,
}

/// Static tag registry with fallbacks.
#[derive(Debug, Clone)]
pub struct ContentCatalog {
    entries: HashMap<String, TagEntry>,
    fallback_title: String,
    fallback_channel: String,
}

impl Default for ContentCatalog {
    fn default() -> Self {
        let entries = builtin::entries()
            .into_iter()
            .map(|(name, entry)| (normalize_tag(name), entry))
            .collect();

        Self {
            entries,
            fallback_title: builtin::FALLBACK_TITLE.to_string(),
            fallback_channel: builtin::FALLBACK_CHANNEL.to_string(),
        }
    }
}

impl ContentCatalog {
    /// Built-in registry with the configured entries layered on top.
    ///
    /// A configured tag replaces the built-in entry of the same name.
    pub fn from_config(config: &ContentConfig) -> Self {
        let mut catalog = Self::default();

        if let Some(title) = config.fallback_title.as_deref().filter(|t| !t.trim().is_empty()) {
            catalog.fallback_title = title.trim().to_string();
        }
        if let Some(channel) = config
            .fallback_channel
            .as_deref()
            .map(strip_namespace)
            .filter(|c| !c.is_empty())
        {
            catalog.fallback_channel = channel.to_string();
        }

        for tag in &config.tags {
            catalog.entries.insert(
                normalize_tag(&tag.name),
                TagEntry {
                    titles: tag.titles.clone(),
                    channels: tag
                        .channels
                        .iter()
                        .map(|c| strip_namespace(c).to_string())
                        .filter(|c| !c.is_empty())
                        .collect(),
                    host_tags: tag.host_tags.clone(),
                    sensitive: tag.sensitive,
                },
            );
        }

        catalog
    }

    /// Look up a tag's registered entry.
    pub fn entry(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.get(&normalize_tag(tag))
    }

    /// Plan a publish using the thread-local RNG.
    pub fn plan(&self, tag: &str, channel_override: Option<&str>) -> ContentPlan {
        self.plan_with_rng(tag, channel_override, &mut rand::thread_rng())
    }

    /// Plan a publish with a caller-provided RNG.
    pub fn plan_with_rng<R: Rng + ?Sized>(
        &self,
        tag: &str,
        channel_override: Option<&str>,
        rng: &mut R,
    ) -> ContentPlan {
        let entry = self.entry(tag);

        ContentPlan {
            title: self.title_with_rng(tag, rng),
            channel: self.channel(tag, channel_override),
            host_tags: entry
                .map(|e| e.host_tags.iter().take(MAX_HOST_TAGS).cloned().collect())
                .unwrap_or_default(),
            sensitive: entry.map(|e| e.sensitive).unwrap_or(true),
        }
    }

    /// Pick a title for the tag.
    pub fn title_with_rng<R: Rng + ?Sized>(&self, tag: &str, rng: &mut R) -> String {
        self.entry(tag)
            .and_then(|e| e.titles.choose(rng))
            .cloned()
            .unwrap_or_else(|| self.fallback_title.clone())
    }

    /// Resolve the target channel: override, tag default, or fallback.
    pub fn channel(&self, tag: &str, channel_override: Option<&str>) -> String {
        if let Some(channel) = channel_override
            .map(strip_namespace)
            .filter(|c| !c.is_empty())
        {
            return channel.to_string();
        }

        self.entry(tag)
            .and_then(|e| e.channels.first())
            .cloned()
            .unwrap_or_else(|| self.fallback_channel.clone())
    }
}

/// Strip a leading community/user namespace ("r/", "/r/", "u/", "/u/").
pub fn strip_namespace(channel: &str) -> &str {
    let trimmed = channel.trim().trim_start_matches('/');
    for prefix in ["r/", "R/", "u/", "U/"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim_matches('/');
        }
    }
    trimmed.trim_end_matches('/')
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_uppercase()
}
