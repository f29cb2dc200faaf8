//! URL checks for manually supplied links and hosting sources.

use reelcast_common::{Error, Result};
use reqwest::Url;

/// Check that `raw` is an http(s) URL on `domain` or one of its subdomains.
///
/// Returns the trimmed URL. `what` names the field in error messages.
pub fn validate_platform_url(raw: &str, domain: &str, what: &str) -> Result<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::invalid_input(format!("{} is not a valid URL ({}): {}", what, e, trimmed)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::invalid_input(format!(
            "{} must use http or https: {}",
            what, trimmed
        )));
    }

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let domain = domain.trim().trim_start_matches('.').to_ascii_lowercase();

    if host == domain || host.ends_with(&format!(".{}", domain)) {
        Ok(trimmed.to_string())
    } else {
        Err(Error::invalid_input(format!(
            "{} must be on {}, got {}",
            what, domain, host
        )))
    }
}

/// URL the media host should fetch the asset from.
///
/// A storage key that is already an http(s) URL is used as-is; otherwise it
/// is joined onto the configured public base URL.
pub fn source_url(storage_key: &str, public_base_url: Option<&str>) -> Result<String> {
    let key = storage_key.trim();
    if let Ok(url) = Url::parse(key) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(key.to_string());
        }
    }

    match public_base_url.map(str::trim).filter(|b| !b.is_empty()) {
        Some(base) => Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            key.trim_start_matches('/')
        )),
        None => Err(Error::invalid_input(format!(
            "storage key {} is not a public URL and storage.public_base_url is not set",
            key
        ))),
    }
}
