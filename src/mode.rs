//! Mode resolution.
//!
//! A platform stage is `auto` only when every credential it needs is present
//! and non-blank. Nothing here is cached; callers resolve from a fresh
//! configuration snapshot each time.

use reelcast_common::{PublishModes, StageMode};

use crate::config::{Config, MediaHostConfig, SocialConfig};

/// Resolve both stages from a configuration snapshot.
pub fn resolve_modes(config: &Config) -> PublishModes {
    PublishModes {
        media_host: media_host_mode(&config.media_host),
        social: social_mode(&config.social),
    }
}

/// Mode for the media host stage.
pub fn media_host_mode(config: &MediaHostConfig) -> StageMode {
    mode_for(&[&config.client_id, &config.client_secret])
}

/// Mode for the social stage.
pub fn social_mode(config: &SocialConfig) -> StageMode {
    mode_for(&[
        &config.client_id,
        &config.client_secret,
        &config.username,
        &config.password,
    ])
}

/// Names of the media host credentials that are missing.
pub fn missing_media_host_credentials(config: &MediaHostConfig) -> Vec<&'static str> {
    missing(&[
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
    ])
}

/// Names of the social credentials that are missing.
pub fn missing_social_credentials(config: &SocialConfig) -> Vec<&'static str> {
    missing(&[
        ("client_id", &config.client_id),
        ("client_secret", &config.client_secret),
        ("username", &config.username),
        ("password", &config.password),
    ])
}

fn is_present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn mode_for(fields: &[&Option<String>]) -> StageMode {
    if fields.iter().all(|f| is_present(f)) {
        StageMode::Auto
    } else {
        StageMode::Manual
    }
}

fn missing(fields: &[(&'static str, &Option<String>)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| !is_present(value))
        .map(|(name, _)| *name)
        .collect()
}
