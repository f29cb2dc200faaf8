//! Reelcast-DB: Database schema, migrations, and query operations
//!
//! This crate stores assets and posts in SQLite using rusqlite and r2d2
//! connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use reelcast_db::models::NewAsset;
//! use reelcast_db::pool::{get_conn, init_pool};
//! use reelcast_db::queries::assets;
//!
//! let pool = init_pool("/var/lib/reelcast/reelcast.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let asset = assets::create_asset(&conn, &NewAsset::ready("uploads/a.mp4", "a.mp4")).unwrap();
//! println!("Registered asset {}", asset.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
