//! Post query operations.
//!
//! Every status write is guarded by the status the caller believes the post
//! is in. A guarded update that matches no row returns `false` so the caller
//! can tell a stale view apart from a storage failure.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use reelcast_common::{AssetId, Error, PostId, PostStatus, Result};

use super::{parse_enum, parse_optional_timestamp, parse_timestamp};
use crate::models::{NewPost, Post};

const POST_COLUMNS: &str = "id, asset_id, platform, channel, title, sensitive, post_url, status,
                            error_message, created_at, updated_at, completed_at";

const UNKNOWN_ERROR: &str = "unknown error";

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: PostId::from(row.get::<_, i64>(0)?),
        asset_id: AssetId::from(row.get::<_, i64>(1)?),
        platform: row.get(2)?,
        channel: row.get(3)?,
        title: row.get(4)?,
        sensitive: row.get(5)?,
        post_url: row.get(6)?,
        status: parse_enum(7, row.get(7)?)?,
        error_message: row.get(8)?,
        created_at: parse_timestamp(9, row.get(9)?)?,
        updated_at: parse_timestamp(10, row.get(10)?)?,
        completed_at: parse_optional_timestamp(11, row.get(11)?)?,
    })
}

fn check_transition(from: PostStatus, to: PostStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::invalid_state(format!(
            "transition {} -> {} is not allowed",
            from, to
        )))
    }
}

fn query_posts(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Post>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| Error::persistence(e.to_string()))?;

    let posts = stmt
        .query_map(args, row_to_post)
        .map_err(|e| Error::persistence(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(posts)
}

/// Create a new post in its initial status.
pub fn create_post(conn: &Connection, post: &NewPost) -> Result<Post> {
    if post.status.is_terminal() {
        return Err(Error::invalid_state(format!(
            "a post cannot be created as {}",
            post.status
        )));
    }

    let now = Utc::now();

    conn.execute(
        "INSERT INTO posts (asset_id, platform, channel, title, sensitive, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            post.asset_id.get(),
            post.platform,
            post.channel,
            post.title,
            post.sensitive,
            post.status.to_string(),
            now.to_rfc3339(),
            now.to_rfc3339(),
        ],
    )
    .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(Post {
        id: PostId::from(conn.last_insert_rowid()),
        asset_id: post.asset_id,
        platform: post.platform.clone(),
        channel: post.channel.clone(),
        title: post.title.clone(),
        sensitive: post.sensitive,
        post_url: None,
        status: post.status,
        error_message: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
    })
}

/// Get a post by ID.
pub fn get_post(conn: &Connection, id: PostId) -> Result<Post> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"),
        [id.get()],
        row_to_post,
    )
    .optional()
    .map_err(|e| Error::persistence(e.to_string()))?
    .ok_or_else(|| Error::not_found("post", id))
}

/// List all posts, newest first.
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>> {
    query_posts(
        conn,
        &format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"),
        [],
    )
}

/// List the posts of one asset, newest first.
pub fn list_posts_for_asset(conn: &Connection, asset_id: AssetId) -> Result<Vec<Post>> {
    query_posts(
        conn,
        &format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE asset_id = ?
             ORDER BY created_at DESC, id DESC"
        ),
        [asset_id.get()],
    )
}

/// Move a post between two non-terminal states.
///
/// Terminal states have their own functions because they carry side
/// effects: [`complete_post`] and [`fail_post`].
pub fn transition_post(
    conn: &Connection,
    id: PostId,
    from: PostStatus,
    to: PostStatus,
) -> Result<bool> {
    check_transition(from, to)?;
    if to.is_terminal() {
        return Err(Error::invalid_state(format!(
            "use complete_post/fail_post to reach {}",
            to
        )));
    }

    let affected = conn
        .execute(
            "UPDATE posts SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
            params![
                to.to_string(),
                Utc::now().to_rfc3339(),
                id.get(),
                from.to_string()
            ],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(affected > 0)
}

/// Mark a post as posted with its live URL.
pub fn complete_post(conn: &Connection, id: PostId, from: PostStatus, post_url: &str) -> Result<bool> {
    check_transition(from, PostStatus::Posted)?;
    if post_url.trim().is_empty() {
        return Err(Error::invalid_input("post URL is empty"));
    }

    let now = Utc::now().to_rfc3339();
    let affected = conn
        .execute(
            "UPDATE posts SET status = 'posted', post_url = ?, error_message = NULL,
             completed_at = ?, updated_at = ?
             WHERE id = ? AND status = ?",
            params![post_url, now, now, id.get(), from.to_string()],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(affected > 0)
}

/// Mark a post as failed with a human-readable message.
pub fn fail_post(conn: &Connection, id: PostId, from: PostStatus, message: &str) -> Result<bool> {
    check_transition(from, PostStatus::Failed)?;
    let message = if message.trim().is_empty() {
        UNKNOWN_ERROR
    } else {
        message
    };

    let affected = conn
        .execute(
            "UPDATE posts SET status = 'failed', error_message = ?, updated_at = ?
             WHERE id = ? AND status = ?",
            params![message, Utc::now().to_rfc3339(), id.get(), from.to_string()],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;

    Ok(affected > 0)
}
