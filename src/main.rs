mod cli;

use reelcast::{
    catalog::SqliteCatalog,
    config::{self, ConfigStore},
    mode,
    publish::Publisher,
};
use reelcast_common::{AssetId, PostId};
use reelcast_db::models::NewAsset;
use reelcast_db::pool::{get_conn, init_pool, DbPool};
use reelcast_db::queries::assets;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Loaded configuration plus an open database.
struct App {
    config: Arc<ConfigStore>,
    pool: DbPool,
}

impl App {
    fn open(config_path: Option<&Path>) -> Result<Self> {
        let path = config::find_config_path(config_path);
        let loaded = config::load_config_or_default(path.as_deref())?;
        let store = Arc::new(ConfigStore::new(loaded));

        let db_path = store.snapshot().database.path;
        tracing::debug!("Opening database at {}", db_path.display());
        let pool = init_pool(&db_path.to_string_lossy())
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        Ok(Self {
            config: store,
            pool,
        })
    }

    fn publisher(&self) -> Publisher {
        let catalog = Arc::new(SqliteCatalog::new(self.pool.clone()));
        Publisher::with_default_platforms(catalog, self.config.clone())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelcast=trace,reelcast_db=debug,reelcast_common=debug".to_string()
        } else {
            "reelcast=info,reelcast_db=warn".to_string()
        }
    });

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::AssetAdd {
            storage_key,
            name,
            tag,
            mime_type,
            size,
        } => add_asset(config_path, storage_key, name, tag, mime_type, size),
        Commands::Assets => {
            let app = App::open(config_path)?;
            let conn = get_conn(&app.pool)?;
            print_json(&assets::list_assets(&conn)?)
        }
        Commands::Publish { asset_id, channel } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(publish(config_path, AssetId::from(asset_id), channel))
        }
        Commands::Posts { asset } => {
            let publisher = App::open(config_path)?.publisher();
            let posts = match asset {
                Some(id) => publisher.list_posts_for_asset(AssetId::from(id))?,
                None => publisher.list_posts()?,
            };
            print_json(&posts)
        }
        Commands::Post { id } => {
            let publisher = App::open(config_path)?.publisher();
            print_json(&publisher.get_post(PostId::from(id))?)
        }
        Commands::Mode => show_mode(config_path),
        Commands::SupplyMediaUrl { post_id, url } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let publisher = App::open(config_path)?.publisher();
                let supplied = publisher
                    .supply_media_host_url(PostId::from(post_id), &url)
                    .await?;
                print_json(&supplied)?;
                publisher.shutdown().await;
                Ok::<(), anyhow::Error>(())
            })
        }
        Commands::SupplyPostUrl { post_id, url } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let publisher = App::open(config_path)?.publisher();
                let supplied = publisher
                    .supply_social_post_url(PostId::from(post_id), &url)
                    .await?;
                print_json(&supplied)
            })
        }
        Commands::Validate { config: path } => {
            let path = path.or_else(|| cli.config.clone());
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn add_asset(
    config_path: Option<&Path>,
    storage_key: String,
    name: Option<String>,
    tag: String,
    mime_type: String,
    size: i64,
) -> Result<()> {
    if storage_key.trim().is_empty() {
        anyhow::bail!("Storage key cannot be empty");
    }

    let display_name = name.unwrap_or_else(|| {
        storage_key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&storage_key)
            .to_string()
    });

    let app = App::open(config_path)?;
    let mut new_asset = NewAsset::ready(storage_key, display_name).with_tag(tag);
    new_asset.mime_type = mime_type;
    new_asset.size_bytes = size;

    let conn = get_conn(&app.pool)?;
    let asset = assets::create_asset(&conn, &new_asset)?;
    tracing::info!(asset_id = %asset.id, "Asset registered");
    print_json(&asset)
}

async fn publish(
    config_path: Option<&Path>,
    asset_id: AssetId,
    channel: Option<String>,
) -> Result<()> {
    let publisher = App::open(config_path)?.publisher();
    let outcome = publisher.publish(asset_id, channel.as_deref()).await?;

    // Auto runs are detached; wait for them to record a final status
    publisher.shutdown().await;

    let post = publisher.get_post(outcome.post_id)?;
    print_json(&serde_json::json!({
        "outcome": outcome,
        "post": post,
    }))
}

fn show_mode(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = ConfigStore::new(config);
    let snapshot = store.snapshot();
    let modes = mode::resolve_modes(&snapshot);

    print_json(&serde_json::json!({
        "media_host": modes.media_host,
        "social": modes.social,
        "mode": modes.overall(),
        "missing": {
            "media_host": mode::missing_media_host_credentials(&snapshot.media_host),
            "social": mode::missing_social_credentials(&snapshot.social),
        },
    }))
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            let modes = mode::resolve_modes(&config);
            println!("✓ Configuration is valid");
            println!("  Database: {}", config.database.path.display());
            println!("  Media host: {} ({})", config.media_host.domain, modes.media_host);
            println!("  Social: {} ({})", config.social.domain, modes.social);
            println!("  Content tags: {}", config.content.tags.len());
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Database: {}", config.database.path.display());
            println!("  Media host: {}", config.media_host.domain);
            println!("  Social: {}", config.social.domain);
        }
    }

    Ok(())
}
