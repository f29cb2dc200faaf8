//! Per-adapter access token cache.
//!
//! Each adapter owns one [`TokenCache`]. The lock is held only for the
//! read-check or the write, never across a network call, so two concurrent
//! callers may both refresh. The last write wins and its expiry is always
//! computed from its own TTL.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Subtracted from the platform-reported TTL before caching.
pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Longest a token is kept, whatever TTL the platform reports.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TokenCache {
    slot: Mutex<Option<CachedToken>>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            clock,
        }
    }

    /// The cached token, if one exists and has not expired.
    pub fn current(&self) -> Option<String> {
        let now = self.clock.now();
        self.slot
            .lock()
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.value.clone())
    }

    /// Cache a freshly issued token and return it.
    ///
    /// A TTL at or below the safety margin is cached as already expired; the
    /// caller still uses the token for the request in hand. Lifetimes are
    /// capped at [`MAX_TOKEN_LIFETIME`].
    pub fn store(&self, token: String, ttl: Duration) -> String {
        let now = self.clock.now();
        let lifetime = ttl
            .saturating_sub(TOKEN_SAFETY_MARGIN)
            .min(MAX_TOKEN_LIFETIME);
        let expires_at = now.checked_add(lifetime).unwrap_or(now);
        *self.slot.lock() = Some(CachedToken {
            value: token.clone(),
            expires_at,
        });
        token
    }

    /// Drop the cached token, forcing the next call to authenticate.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Time until the cached token expires.
    pub fn expires_in(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.slot
            .lock()
            .as_ref()
            .map(|t| t.expires_at.saturating_duration_since(now))
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token itself
        f.debug_struct("TokenCache")
            .field("cached", &self.slot.lock().is_some())
            .finish()
    }
}
