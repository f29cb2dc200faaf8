//! Persistence seam used by the publisher.
//!
//! The publisher only needs simple reads and guarded updates, so it talks to
//! a [`Catalog`] rather than to SQLite directly. [`SqliteCatalog`] is the
//! production implementation; each call checks a connection out of the pool
//! and returns it before the caller awaits anything.

use reelcast_common::{AssetId, PostId, PostStatus, Result};
use reelcast_db::models::{Asset, NewPost, Post};
use reelcast_db::pool::{get_conn, DbPool};
use reelcast_db::queries::{assets, posts};

pub trait Catalog: Send + Sync {
    fn get_asset(&self, id: AssetId) -> Result<Asset>;

    /// Cache the hosted URL on an asset. Returns `false` if one was already set.
    fn cache_media_host_url(&self, id: AssetId, url: &str) -> Result<bool>;

    fn create_post(&self, post: &NewPost) -> Result<Post>;

    fn get_post(&self, id: PostId) -> Result<Post>;

    /// All posts, newest first.
    fn list_posts(&self) -> Result<Vec<Post>>;

    /// Posts for one asset, newest first.
    fn list_posts_for_asset(&self, asset_id: AssetId) -> Result<Vec<Post>>;

    /// Guarded move between non-terminal states. `false` if the post was no
    /// longer in `from`.
    fn transition_post(&self, id: PostId, from: PostStatus, to: PostStatus) -> Result<bool>;

    fn complete_post(&self, id: PostId, from: PostStatus, post_url: &str) -> Result<bool>;

    fn fail_post(&self, id: PostId, from: PostStatus, message: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Catalog for SqliteCatalog {
    fn get_asset(&self, id: AssetId) -> Result<Asset> {
        let conn = get_conn(&self.pool)?;
        assets::get_asset(&conn, id)
    }

    fn cache_media_host_url(&self, id: AssetId, url: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        assets::cache_media_host_url(&conn, id, url)
    }

    fn create_post(&self, post: &NewPost) -> Result<Post> {
        let conn = get_conn(&self.pool)?;
        posts::create_post(&conn, post)
    }

    fn get_post(&self, id: PostId) -> Result<Post> {
        let conn = get_conn(&self.pool)?;
        posts::get_post(&conn, id)
    }

    fn list_posts(&self) -> Result<Vec<Post>> {
        let conn = get_conn(&self.pool)?;
        posts::list_posts(&conn)
    }

    fn list_posts_for_asset(&self, asset_id: AssetId) -> Result<Vec<Post>> {
        let conn = get_conn(&self.pool)?;
        posts::list_posts_for_asset(&conn, asset_id)
    }

    fn transition_post(&self, id: PostId, from: PostStatus, to: PostStatus) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        posts::transition_post(&conn, id, from, to)
    }

    fn complete_post(&self, id: PostId, from: PostStatus, post_url: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        posts::complete_post(&conn, id, from, post_url)
    }

    fn fail_post(&self, id: PostId, from: PostStatus, message: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        posts::fail_post(&conn, id, from, message)
    }
}
