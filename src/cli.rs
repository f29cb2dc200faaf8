use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelcast")]
#[command(author, version, about = "Host media and post links to social platforms")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register an uploaded asset
    AssetAdd {
        /// Storage key or public URL of the uploaded file
        #[arg(required = true)]
        storage_key: String,

        /// Display name (defaults to the last path segment)
        #[arg(long)]
        name: Option<String>,

        /// Content tag used to pick a title and channel
        #[arg(long, default_value = "")]
        tag: String,

        #[arg(long, default_value = "video/mp4")]
        mime_type: String,

        #[arg(long, default_value = "0")]
        size: i64,
    },

    /// List registered assets
    Assets,

    /// Publish an asset
    Publish {
        asset_id: i64,

        /// Post to this channel instead of the tag default
        #[arg(long)]
        channel: Option<String>,
    },

    /// List posts, newest first
    Posts {
        /// Only posts for this asset
        #[arg(long)]
        asset: Option<i64>,
    },

    /// Show one post
    Post { id: i64 },

    /// Show the current auto/manual verdict per platform
    Mode,

    /// Report a media host URL for a post awaiting one
    SupplyMediaUrl { post_id: i64, url: String },

    /// Report a social post URL for a post awaiting one
    SupplyPostUrl { post_id: i64, url: String },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
