//! Reelcast - Publishing orchestration for hosted media
//!
//! This library crate exposes the engine for the CLI and for integration
//! testing.

pub mod catalog;
pub mod config;
pub mod content;
pub mod mode;
pub mod platforms;
pub mod publish;
