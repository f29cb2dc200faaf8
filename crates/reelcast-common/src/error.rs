//! Error taxonomy shared across reelcast.
//!
//! Caller-facing failures (unknown ids, wrong state, bad input) are returned
//! synchronously. Platform failures carry the platform name and the upstream
//! message so the orchestrator can record them on a failed post verbatim.

use std::fmt;

/// Common error type for reelcast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested asset or post does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity ("asset", "post").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The operation is not valid for the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller-supplied data was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A platform adapter could not obtain or refresh a credential.
    #[error("{platform} authentication failed: {message}")]
    Authentication {
        /// Platform that rejected the credentials.
        platform: String,
        /// Message reported by the platform or transport.
        message: String,
    },

    /// A platform's primary call returned an error or timed out.
    #[error("{platform} request failed: {message}")]
    Upstream {
        /// Platform whose call failed.
        platform: String,
        /// Message reported by the platform or transport.
        message: String,
    },

    /// A store read or write failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new InvalidState error.
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Authentication error.
    pub fn authentication(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            platform: platform.into(),
            message: message.into(),
        }
    }

    /// Create a new Upstream error.
    pub fn upstream(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            platform: platform.into(),
            message: message.into(),
        }
    }

    /// Create a new Persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Message recorded on a post that failed because of this error.
    ///
    /// Upstream failures keep the platform's own wording; everything else
    /// uses the display form.
    pub fn detail(&self) -> String {
        match self {
            Self::Upstream { message, .. } => message.clone(),
            Self::Authentication { message, .. } => {
                format!("authentication failed: {}", message)
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
