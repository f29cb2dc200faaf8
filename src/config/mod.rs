mod store;
mod types;

pub use store::ConfigStore;
pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variables that override credential fields.
pub const ENV_REDGIFS_CLIENT_ID: &str = "REDGIFS_CLIENT_ID";
pub const ENV_REDGIFS_CLIENT_SECRET: &str = "REDGIFS_CLIENT_SECRET";
pub const ENV_REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_REDDIT_USERNAME: &str = "REDDIT_USERNAME";
pub const ENV_REDDIT_PASSWORD: &str = "REDDIT_PASSWORD";
pub const ENV_REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Locate the config file: the given path, or the first default that exists.
pub fn find_config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        return Some(path.to_path_buf());
    }

    let default_paths = [
        "./reelcast.toml",
        "~/.config/reelcast/config.toml",
        "/etc/reelcast/config.toml",
    ];

    default_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    match find_config_path(custom_path) {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Overlay credential fields from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Overlay credential fields from an arbitrary lookup.
///
/// Variables that are unset leave the file value alone; variables set to an
/// empty string clear it.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let overlay = |slot: &mut Option<String>, key: &str| {
        if let Some(value) = lookup(key) {
            *slot = Some(value);
        }
    };

    overlay(&mut config.media_host.client_id, ENV_REDGIFS_CLIENT_ID);
    overlay(&mut config.media_host.client_secret, ENV_REDGIFS_CLIENT_SECRET);
    overlay(&mut config.social.client_id, ENV_REDDIT_CLIENT_ID);
    overlay(&mut config.social.client_secret, ENV_REDDIT_CLIENT_SECRET);
    overlay(&mut config.social.username, ENV_REDDIT_USERNAME);
    overlay(&mut config.social.password, ENV_REDDIT_PASSWORD);

    if let Some(agent) = lookup(ENV_REDDIT_USER_AGENT).filter(|a| !a.trim().is_empty()) {
        config.social.user_agent = agent;
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.media_host.timeout_secs == 0 {
        anyhow::bail!("media_host.timeout_secs cannot be 0");
    }
    if config.social.timeout_secs == 0 {
        anyhow::bail!("social.timeout_secs cannot be 0");
    }

    if config.media_host.domain.trim().is_empty() {
        anyhow::bail!("media_host.domain cannot be empty");
    }
    if config.social.domain.trim().is_empty() {
        anyhow::bail!("social.domain cannot be empty");
    }

    for tag in &config.content.tags {
        if tag.name.trim().is_empty() {
            anyhow::bail!("content tag entries must have a name");
        }
        if tag.titles.is_empty() {
            tracing::warn!(
                "Content tag '{}' has no titles; the fallback title will be used",
                tag.name
            );
        }
    }

    if let Some(base) = &config.storage.public_base_url {
        if !base.starts_with("http://") && !base.starts_with("https://") {
            anyhow::bail!("storage.public_base_url must be an http(s) URL");
        }
    }

    Ok(())
}
