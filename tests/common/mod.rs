//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a [`Publisher`] to an in-memory DB,
//! a fixed config store, and fake platform adapters that count their calls.
//! The catalog can be told to fail or refuse individual writes.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use reelcast::catalog::{Catalog, SqliteCatalog};
use reelcast::config::{Config, ConfigStore};
use reelcast::platforms::{MediaHost, SocialPlatform};
use reelcast::publish::Publisher;
use reelcast_common::{AssetId, Error, PostId, PostStatus, Result, StageMode};
use reelcast_db::models::{Asset, NewAsset, NewPost, Post};
use reelcast_db::pool::{get_conn, init_memory_pool, DbPool, PooledConnection};
use reelcast_db::queries::assets;

pub const PUBLIC_BASE: &str = "https://cdn.example.com/media";
pub const HOSTED_URL: &str = "https://www.redgifs.com/watch/quietmoth";
pub const POSTED_URL: &str = "https://www.reddit.com/r/TransGoneWild/comments/abc/rate_this/";

/// Canned result for a fake adapter call.
#[derive(Debug, Clone)]
pub enum Outcome {
    Url(String),
    Upstream(String),
    Authentication(String),
    /// The adapter call panics.
    Panic,
}

impl Outcome {
    fn into_result(self, platform: &str) -> Result<String> {
        match self {
            Outcome::Url(url) => Ok(url),
            Outcome::Upstream(msg) => Err(Error::upstream(platform, msg)),
            Outcome::Authentication(msg) => Err(Error::authentication(platform, msg)),
            Outcome::Panic => panic!("{platform} adapter panicked"),
        }
    }
}

/// Blocks adapter calls until released.
#[derive(Default)]
struct Gate {
    held: AtomicBool,
    notify: Notify,
}

impl Gate {
    async fn pass(&self) {
        if self.held.load(Ordering::SeqCst) {
            self.notify.notified().await;
        }
    }

    fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

/// Recorded arguments of a `host` call.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRequest {
    pub source_url: String,
    pub title: String,
    pub tags: Vec<String>,
}

pub struct FakeMediaHost {
    calls: AtomicUsize,
    outcome: Mutex<Outcome>,
    last: Mutex<Option<HostRequest>>,
    gate: Gate,
}

impl FakeMediaHost {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(Outcome::Url(HOSTED_URL.to_string())),
            last: Mutex::new(None),
            gate: Gate::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn respond_with(&self, outcome: Outcome) {
        *self.outcome.lock() = outcome;
    }

    pub fn last_request(&self) -> Option<HostRequest> {
        self.last.lock().clone()
    }

    pub fn hold(&self) {
        self.gate.hold();
    }

    pub fn release(&self) {
        self.gate.release();
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    fn name(&self) -> &'static str {
        "redgifs"
    }

    async fn host(&self, source_url: &str, title: &str, tags: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(HostRequest {
            source_url: source_url.to_string(),
            title: title.to_string(),
            tags: tags.to_vec(),
        });
        self.gate.pass().await;
        let outcome = self.outcome.lock().clone();
        outcome.into_result(self.name())
    }
}

/// Recorded arguments of a `post` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub channel: String,
    pub title: String,
    pub url: String,
    pub sensitive: bool,
}

pub struct FakeSocial {
    calls: AtomicUsize,
    outcome: Mutex<Outcome>,
    last: Mutex<Option<Submission>>,
}

impl FakeSocial {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(Outcome::Url(POSTED_URL.to_string())),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn respond_with(&self, outcome: Outcome) {
        *self.outcome.lock() = outcome;
    }

    pub fn last_submission(&self) -> Option<Submission> {
        self.last.lock().clone()
    }
}

#[async_trait]
impl SocialPlatform for FakeSocial {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn post(
        &self,
        channel: &str,
        title: &str,
        url: &str,
        sensitive: bool,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(Submission {
            channel: channel.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            sensitive,
        });
        let outcome = self.outcome.lock().clone();
        outcome.into_result(self.name())
    }
}

/// How a faulted catalog write misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFault {
    /// The store returns a persistence error.
    Error,
    /// The guard does not match, as if another writer got there first.
    Stale,
}

impl WriteFault {
    fn apply(self) -> Result<bool> {
        match self {
            WriteFault::Error => Err(Error::persistence("disk I/O error")),
            WriteFault::Stale => Ok(false),
        }
    }
}

/// SQLite catalog with per-write fault injection.
pub struct FaultyCatalog {
    inner: SqliteCatalog,
    transition: Mutex<Option<(PostStatus, WriteFault)>>,
    complete: Mutex<Option<WriteFault>>,
    fail: Mutex<Option<WriteFault>>,
}

impl FaultyCatalog {
    pub fn new(db: DbPool) -> Self {
        Self {
            inner: SqliteCatalog::new(db),
            transition: Mutex::new(None),
            complete: Mutex::new(None),
            fail: Mutex::new(None),
        }
    }

    /// Fault every transition into `to`.
    pub fn fault_transition_to(&self, to: PostStatus, fault: WriteFault) {
        *self.transition.lock() = Some((to, fault));
    }

    pub fn fault_complete(&self, fault: WriteFault) {
        *self.complete.lock() = Some(fault);
    }

    pub fn fault_fail(&self, fault: WriteFault) {
        *self.fail.lock() = Some(fault);
    }
}

impl Catalog for FaultyCatalog {
    fn get_asset(&self, id: AssetId) -> Result<Asset> {
        self.inner.get_asset(id)
    }

    fn cache_media_host_url(&self, id: AssetId, url: &str) -> Result<bool> {
        self.inner.cache_media_host_url(id, url)
    }

    fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.inner.create_post(post)
    }

    fn get_post(&self, id: PostId) -> Result<Post> {
        self.inner.get_post(id)
    }

    fn list_posts(&self) -> Result<Vec<Post>> {
        self.inner.list_posts()
    }

    fn list_posts_for_asset(&self, asset_id: AssetId) -> Result<Vec<Post>> {
        self.inner.list_posts_for_asset(asset_id)
    }

    fn transition_post(&self, id: PostId, from: PostStatus, to: PostStatus) -> Result<bool> {
        match *self.transition.lock() {
            Some((target, fault)) if target == to => fault.apply(),
            _ => self.inner.transition_post(id, from, to),
        }
    }

    fn complete_post(&self, id: PostId, from: PostStatus, post_url: &str) -> Result<bool> {
        match *self.complete.lock() {
            Some(fault) => fault.apply(),
            None => self.inner.complete_post(id, from, post_url),
        }
    }

    fn fail_post(&self, id: PostId, from: PostStatus, message: &str) -> Result<bool> {
        match *self.fail.lock() {
            Some(fault) => fault.apply(),
            None => self.inner.fail_post(id, from, message),
        }
    }
}

/// Config whose credentials make each stage resolve to the given mode.
pub fn config_with(media_host: StageMode, social: StageMode) -> Config {
    let mut config = Config::default();
    config.storage.public_base_url = Some(PUBLIC_BASE.to_string());
    set_media_host_credentials(&mut config, media_host);
    set_social_credentials(&mut config, social);
    config
}

pub fn set_media_host_credentials(config: &mut Config, mode: StageMode) {
    let (id, secret) = match mode {
        StageMode::Auto => (Some("rg-id".to_string()), Some("rg-secret".to_string())),
        StageMode::Manual => (None, None),
    };
    config.media_host.client_id = id;
    config.media_host.client_secret = secret;
}

pub fn set_social_credentials(config: &mut Config, mode: StageMode) {
    let creds = match mode {
        StageMode::Auto => Some(["rd-id", "rd-secret", "poster", "hunter2"]),
        StageMode::Manual => None,
    };
    let field = |i: usize| creds.map(|c| c[i].to_string());
    config.social.client_id = field(0);
    config.social.client_secret = field(1);
    config.social.username = field(2);
    config.social.password = field(3);
}

/// Publisher over an in-memory database and fake adapters.
pub struct TestHarness {
    pub db: DbPool,
    pub config: Arc<ConfigStore>,
    pub catalog: Arc<FaultyCatalog>,
    pub media_host: Arc<FakeMediaHost>,
    pub social: Arc<FakeSocial>,
    pub publisher: Publisher,
}

impl TestHarness {
    /// Create a harness whose stages resolve to the given modes.
    pub fn new(media_host: StageMode, social: StageMode) -> Self {
        Self::with_config(config_with(media_host, social))
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let config = Arc::new(ConfigStore::fixed(config));
        let catalog = Arc::new(FaultyCatalog::new(db.clone()));
        let media_host = Arc::new(FakeMediaHost::new());
        let social = Arc::new(FakeSocial::new());

        let publisher = Publisher::new(
            catalog.clone(),
            config.clone(),
            media_host.clone(),
            social.clone(),
        );

        Self {
            db,
            config,
            catalog,
            media_host,
            social,
            publisher,
        }
    }

    /// Get a database connection from the pool.
    ///
    /// The in-memory pool holds one connection; drop it before publishing.
    pub fn conn(&self) -> PooledConnection {
        get_conn(&self.db).expect("failed to get db connection")
    }

    /// Register a ready asset with the given content tag.
    pub fn add_asset(&self, tag: &str) -> AssetId {
        let asset = NewAsset::ready("uploads/clip.mp4", "clip.mp4").with_tag(tag);
        assets::create_asset(&self.conn(), &asset)
            .expect("failed to create asset")
            .id
    }

    /// Register a ready asset that already has a media host URL.
    pub fn add_hosted_asset(&self, tag: &str, url: &str) -> AssetId {
        let id = self.add_asset(tag);
        assets::cache_media_host_url(&self.conn(), id, url).expect("failed to cache url");
        id
    }

    pub fn cached_url(&self, id: AssetId) -> Option<String> {
        assets::get_asset(&self.conn(), id)
            .expect("asset should exist")
            .media_host_url
    }

    /// Wait until every detached run has finished.
    pub async fn settle(&self) {
        self.publisher.wait_idle().await;
    }
}
