//! Reelcast-Common: Shared types and errors for the publishing engine.
//!
//! This crate provides the vocabulary every other reelcast crate speaks:
//!
//! - **Typed IDs**: Integer wrappers for assets and posts
//! - **Status Types**: The asset lifecycle and the post state machine
//! - **Modes**: Per-platform auto/manual verdicts
//! - **Error Handling**: The error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use reelcast_common::{AssetId, Error, PostStatus, Result};
//!
//! let asset_id = AssetId::from(7);
//! assert_eq!(asset_id.to_string(), "7");
//!
//! assert!(PostStatus::Queued.can_transition_to(PostStatus::UploadingMedia));
//!
//! fn lookup(id: AssetId) -> Result<()> {
//!     Err(Error::not_found("asset", id))
//! }
//! assert!(lookup(asset_id).is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
