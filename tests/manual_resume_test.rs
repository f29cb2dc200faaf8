//! Integration tests for the manual resume operations.

mod common;

use assert_matches::assert_matches;
use common::{Outcome, TestHarness, WriteFault, HOSTED_URL, POSTED_URL};
use reelcast_common::{Error, PostId, PostStatus, StageMode};

const SOLO_TITLES: [&str; 3] = ["Can you handle this?", "What would you do?", "Rate this"];

fn manual() -> TestHarness {
    TestHarness::new(StageMode::Manual, StageMode::Manual)
}

#[tokio::test]
async fn manual_round_trip() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");

    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    assert_eq!(outcome.status, PostStatus::AwaitingMediaHostUrl);
    assert_eq!(outcome.mode, StageMode::Manual);
    assert_eq!(outcome.channel, "TransGoneWild");
    assert!(SOLO_TITLES.contains(&outcome.title.as_str()));

    let supplied = h
        .publisher
        .supply_media_host_url(outcome.post_id, "https://redgifs.com/x")
        .await
        .unwrap();
    assert_eq!(supplied.status, PostStatus::AwaitingSocialPost);
    assert!(!supplied.resumed);
    assert_eq!(supplied.package.url, "https://redgifs.com/x");
    assert_eq!(supplied.package.title, outcome.title);
    assert_eq!(supplied.package.channel, "TransGoneWild");
    assert!(supplied.package.sensitive);
    assert_eq!(h.cached_url(asset_id).as_deref(), Some("https://redgifs.com/x"));

    let done = h
        .publisher
        .supply_social_post_url(outcome.post_id, "https://reddit.com/r/TransGoneWild/y")
        .await
        .unwrap();
    assert_eq!(done.status, PostStatus::Posted);
    assert_eq!(done.post_url, "https://reddit.com/r/TransGoneWild/y");

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::Posted);
    assert_eq!(
        post.post_url.as_deref(),
        Some("https://reddit.com/r/TransGoneWild/y")
    );
    assert!(post.completed_at.is_some());
    assert!(post.error_message.is_none());

    assert_eq!(h.media_host.calls(), 0);
    assert_eq!(h.social.calls(), 0);
}

#[tokio::test]
async fn foreign_media_host_url_is_rejected() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();

    for url in ["https://imgur.com/x", "not a url", "https://redgifs.com.evil.net/x"] {
        let err = h
            .publisher
            .supply_media_host_url(outcome.post_id, url)
            .await
            .unwrap_err();
        assert_matches!(err, Error::InvalidInput(_), "{url}");
    }

    assert_eq!(
        h.publisher.get_post(outcome.post_id).unwrap().status,
        PostStatus::AwaitingMediaHostUrl
    );
    assert!(h.cached_url(asset_id).is_none());
}

#[tokio::test]
async fn foreign_social_url_is_rejected() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    h.publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();

    let err = h
        .publisher
        .supply_social_post_url(outcome.post_id, "https://twitter.com/someone/status/1")
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidInput(_));

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::AwaitingSocialPost);
    assert!(post.post_url.is_none());
}

#[tokio::test]
async fn supply_media_url_on_posted_is_invalid_state() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    h.publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    h.publisher
        .supply_social_post_url(outcome.post_id, POSTED_URL)
        .await
        .unwrap();
    let before = h.publisher.get_post(outcome.post_id).unwrap();

    let err = h
        .publisher
        .supply_media_host_url(outcome.post_id, "https://www.redgifs.com/watch/other")
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));
    assert_eq!(h.publisher.get_post(outcome.post_id).unwrap(), before);

    let err = h
        .publisher
        .supply_social_post_url(outcome.post_id, POSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));
}

#[tokio::test]
async fn supply_media_url_on_failed_is_invalid_state() {
    let h = TestHarness::new(StageMode::Auto, StageMode::Auto);
    h.media_host.respond_with(Outcome::Upstream("timeout".into()));
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    h.settle().await;
    let before = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(before.status, PostStatus::Failed);

    let err = h
        .publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));
    assert_eq!(h.publisher.get_post(outcome.post_id).unwrap(), before);
    assert!(h.cached_url(asset_id).is_none());
}

#[tokio::test]
async fn social_url_before_media_url_is_invalid_state() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();

    let err = h
        .publisher
        .supply_social_post_url(outcome.post_id, POSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));
    assert_eq!(
        h.publisher.get_post(outcome.post_id).unwrap().status,
        PostStatus::AwaitingMediaHostUrl
    );
}

#[tokio::test]
async fn only_social_manual_waits_for_post_url() {
    let h = TestHarness::new(StageMode::Auto, StageMode::Manual);
    let asset_id = h.add_hosted_asset("ANATOMY_SOLO", HOSTED_URL);

    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    assert_eq!(outcome.status, PostStatus::AwaitingSocialPost);
    assert!(outcome.message.as_deref().unwrap().contains(HOSTED_URL));

    let err = h
        .publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));

    let done = h
        .publisher
        .supply_social_post_url(outcome.post_id, "https://old.reddit.com/r/x/comments/1/")
        .await
        .unwrap();
    assert_eq!(done.status, PostStatus::Posted);
    assert_eq!(h.media_host.calls(), 0);
}

#[tokio::test]
async fn manual_media_with_auto_social_resumes() {
    let h = TestHarness::new(StageMode::Manual, StageMode::Auto);
    let asset_id = h.add_asset("OUTFIT");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    assert_eq!(outcome.status, PostStatus::AwaitingMediaHostUrl);

    let supplied = h
        .publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    assert!(supplied.resumed);
    assert_eq!(supplied.status, PostStatus::PostingSocial);

    h.settle().await;

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::Posted);
    assert_eq!(post.post_url.as_deref(), Some(POSTED_URL));

    let submitted = h.social.last_submission().unwrap();
    assert_eq!(submitted.url, HOSTED_URL);
    assert_eq!(submitted.channel, "OUTFITS");
    assert!(!submitted.sensitive);
    assert_eq!(h.media_host.calls(), 0);
}

#[tokio::test]
async fn resumed_social_failure_fails_post() {
    let h = TestHarness::new(StageMode::Manual, StageMode::Auto);
    h.social.respond_with(Outcome::Upstream("timeout".into()));
    let asset_id = h.add_asset("OUTFIT");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();

    h.publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    h.settle().await;

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::Failed);
    assert_eq!(post.error_message.as_deref(), Some("timeout"));
    assert_eq!(h.cached_url(asset_id).as_deref(), Some(HOSTED_URL));
}

#[tokio::test]
async fn credentials_added_after_publish_are_seen_on_resume() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();

    h.config
        .update(|c| common::set_social_credentials(c, StageMode::Auto));

    let supplied = h
        .publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    assert!(supplied.resumed);
    h.settle().await;
    assert_eq!(
        h.publisher.get_post(outcome.post_id).unwrap().status,
        PostStatus::Posted
    );
}

#[tokio::test]
async fn cached_media_host_url_wins() {
    let h = manual();
    let cached = "https://www.redgifs.com/watch/first";
    let asset_id = h.add_hosted_asset("ANATOMY_SOLO", cached);
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    assert!(outcome.message.as_deref().unwrap().contains(cached));

    let supplied = h
        .publisher
        .supply_media_host_url(outcome.post_id, "https://www.redgifs.com/watch/second")
        .await
        .unwrap();
    assert_eq!(supplied.package.url, cached);
    assert_eq!(h.cached_url(asset_id).as_deref(), Some(cached));
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let h = manual();
    let err = h
        .publisher
        .supply_media_host_url(PostId::from(404), HOSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::NotFound { .. });

    let err = h
        .publisher
        .supply_social_post_url(PostId::from(404), POSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::NotFound { .. });
}

#[tokio::test]
async fn concurrent_media_url_change_leaves_asset_untouched() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    h.catalog
        .fault_transition_to(PostStatus::AwaitingSocialPost, WriteFault::Stale);

    let err = h
        .publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));
    assert_eq!(
        h.publisher.get_post(outcome.post_id).unwrap().status,
        PostStatus::AwaitingMediaHostUrl
    );
    assert!(h.cached_url(asset_id).is_none());
}

#[tokio::test]
async fn concurrent_post_url_change_is_invalid_state() {
    let h = manual();
    let asset_id = h.add_asset("ANATOMY_SOLO");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();
    h.publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    h.catalog.fault_complete(WriteFault::Stale);

    let err = h
        .publisher
        .supply_social_post_url(outcome.post_id, POSTED_URL)
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidState(_));

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::AwaitingSocialPost);
    assert!(post.post_url.is_none());
}

#[tokio::test]
async fn panicking_resumed_submission_fails_post() {
    let h = TestHarness::new(StageMode::Manual, StageMode::Auto);
    h.social.respond_with(Outcome::Panic);
    let asset_id = h.add_asset("OUTFIT");
    let outcome = h.publisher.publish(asset_id, None).await.unwrap();

    h.publisher
        .supply_media_host_url(outcome.post_id, HOSTED_URL)
        .await
        .unwrap();
    h.settle().await;

    let post = h.publisher.get_post(outcome.post_id).unwrap();
    assert_eq!(post.status, PostStatus::Failed);
    assert_eq!(
        post.error_message.as_deref(),
        Some("publish run aborted unexpectedly")
    );
}
