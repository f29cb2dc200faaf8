//! Asset query operations.
//!
//! Assets belong to the upload/catalog side; the publishing engine only
//! reads them and writes back the media-host URL once.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use reelcast_common::{AssetId, Error, Result};

use super::{parse_enum, parse_timestamp};
use crate::models::{Asset, NewAsset};

const ASSET_COLUMNS: &str = "id, storage_key, display_name, mime_type, size_bytes, content_tag,
                             status, media_host_url, created_at";

fn row_to_asset(row: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: AssetId::from(row.get::<_, i64>(0)?),
        storage_key: row.get(1)?,
        display_name: row.get(2)?,
        mime_type: row.get(3)?,
        size_bytes: row.get(4)?,
        content_tag: row.get(5)?,
        status: parse_enum(6, row.get(6)?)?,
        media_host_url: row.get(7)?,
        created_at: parse_timestamp(8, row.get(8)?)?,
    })
}

/// Register a new asset.
pub fn create_asset(conn: &Connection, asset: &NewAsset) -> Result<Asset> {
    let now = Utc::now();

    conn.execute(
        "INSERT INTO assets (storage_key, display_name, mime_type, size_bytes, content_tag, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
            asset.storage_key,
            asset.display_name,
            asset.mime_type,
            asset.size_bytes,
            asset.content_tag,
            asset.status.to_string(),
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(Asset {
        id: AssetId::from(conn.last_insert_rowid()),
        storage_key: asset.storage_key.clone(),
        display_name: asset.display_name.clone(),
        mime_type: asset.mime_type.clone(),
        size_bytes: asset.size_bytes,
        content_tag: asset.content_tag.clone(),
        status: asset.status,
        media_host_url: None,
        created_at: now,
    })
}

/// Get an asset by ID.
pub fn get_asset(conn: &Connection, id: AssetId) -> Result<Asset> {
    conn.query_row(
        &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?"),
        [id.get()],
        row_to_asset,
    )
    .optional()
    .map_err(|e| Error::persistence(e.to_string()))?
    .ok_or_else(|| Error::not_found("asset", id))
}

/// List all assets, newest first.
pub fn list_assets(conn: &Connection) -> Result<Vec<Asset>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets ORDER BY created_at DESC, id DESC"
        ))
        .map_err(|e| Error::persistence(e.to_string()))?;

    let assets = stmt
        .query_map([], row_to_asset)
        .map_err(|e| Error::persistence(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(assets)
}

/// Record the media-host URL for an asset unless one is already cached.
///
/// Returns `false` when the asset already had a URL; the stored value is
/// left untouched in that case.
pub fn cache_media_host_url(conn: &Connection, id: AssetId, url: &str) -> Result<bool> {
    if url.trim().is_empty() {
        return Err(Error::invalid_input("media host URL is empty"));
    }

    let affected = conn
        .execute(
            "UPDATE assets SET media_host_url = ? WHERE id = ? AND media_host_url IS NULL",
            params![url, id.get()],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;

    if affected == 0 {
        // Distinguish "already cached" from "no such asset"
        get_asset(conn, id)?;
        return Ok(false);
    }

    Ok(true)
}
