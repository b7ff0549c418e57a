//! End-to-end composer flow tests.
//!
//! Drives the full compose, upload, and submit flow against the in-memory
//! backend. No network access is involved anywhere.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use earthie_backend::{
    CommentAggregate, MemoryBackend, PostType, ProfileRecord, ReactionRecord, Session, UserProfile,
};
use earthie_core::{PostComposer, PostDraft, UploadFile};

const BUCKET: &str = "lobbyist-posts";

fn viewer() -> UserProfile {
    UserProfile {
        id: "user-1".to_string(),
        name: Some("Terra Prime".to_string()),
        username: Some("terra".to_string()),
        avatar: None,
    }
}

fn signed_in_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_session(Session::new("access-token", "user-1"))
        .with_profile(ProfileRecord {
            id: "user-1".to_string(),
            username: Some("terra".to_string()),
            avatar_url: Some("https://cdn.test/avatar.png".to_string()),
        })
}

#[tokio::test]
async fn test_compose_upload_submit_flow() {
    let backend = Arc::new(signed_in_backend().with_aggregates(
        vec![ReactionRecord {
            reaction_type: "hyped".to_string(),
        }],
        vec![CommentAggregate { count: 9 }],
    ));
    let mut composer = PostComposer::new(backend.clone(), BUCKET, Some(viewer()));

    composer.open();
    composer.set_title("Sold my megacity tile");
    composer.set_content("Three properties, all tier 1.");
    composer.set_post_type(PostType::Trade);
    composer.set_sub_lobby(Some("sl3".to_string()));
    assert!(composer.add_tag("earth2"));
    assert!(composer.add_tag("megacity"));

    let files = vec![
        UploadFile::new("front.png", vec![1; 32]),
        UploadFile::new("back.jpg", vec![2; 32]),
    ];
    let appended = composer.upload_images(&files).await.unwrap();
    assert_eq!(appended, 2);
    assert_eq!(backend.object_count().await, 2);

    let post = composer.submit().await.unwrap();

    // The dialog closed and the draft reset.
    assert!(!composer.is_open());
    assert_eq!(*composer.draft(), PostDraft::default());

    // The inserted row carried the draft and the session's author id.
    let rows = backend.inserted_posts().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, "user-1");
    assert_eq!(rows[0].sub_lobby.as_deref(), Some("sl3"));
    assert_eq!(rows[0].image_urls.as_ref().unwrap().len(), 2);

    // The mapped post echoes the content and zeroes the counters.
    assert_eq!(post.title, "Sold my megacity tile");
    assert_eq!(post.post_type, PostType::Trade);
    assert_eq!(post.tags, vec!["earth2", "megacity"]);
    assert_eq!(post.images.len(), 2);
    assert_eq!(post.user.name, "terra");
    assert_eq!(post.user.avatar, "https://cdn.test/avatar.png");
    assert!(post.user.has_profile);
    assert_eq!(post.reactions.hyped, 0);
    assert_eq!(post.reactions.watching, 0);
    assert_eq!(post.comment_count, 0);
    assert_eq!(post.echo_count, 0);
}

#[tokio::test]
async fn test_upload_failure_keeps_earlier_images_and_the_draft_usable() {
    let backend = Arc::new(signed_in_backend().fail_upload_at(2));
    let mut composer = PostComposer::new(backend.clone(), BUCKET, Some(viewer()));

    composer.open();
    composer.set_title("Raid gallery");
    composer.set_content("Screens from last night.");

    let files = vec![
        UploadFile::new("one.png", vec![1; 16]),
        UploadFile::new("two.png", vec![2; 16]),
        UploadFile::new("three.png", vec![3; 16]),
    ];
    let result = composer.upload_images(&files).await;

    assert!(result.is_err());
    assert_eq!(composer.draft().image_urls.len(), 1);
    assert!(composer.upload_error().unwrap().contains("upload failed"));
    // The third file was never attempted.
    assert_eq!(backend.upload_count(), 2);

    // The dialog is still usable: submitting goes through with one image.
    let post = composer.submit().await.unwrap();
    assert_eq!(post.images.len(), 1);
    assert!(!composer.is_open());
}

#[tokio::test]
async fn test_submit_without_session_keeps_dialog_open() {
    let backend = Arc::new(MemoryBackend::new());
    let mut composer = PostComposer::new(backend.clone(), BUCKET, Some(viewer()));

    composer.open();
    composer.set_title("Title");
    composer.set_content("Body");

    let result = composer.submit().await;

    assert!(result.is_err());
    assert!(composer.is_open());
    assert_eq!(composer.error(), Some("Authentication required"));
    assert_eq!(composer.draft().title, "Title");
    assert_eq!(backend.session_count(), 1);
    assert_eq!(backend.insert_count(), 0);
}

#[tokio::test]
async fn test_validation_failures_issue_no_backend_calls() {
    let backend = Arc::new(signed_in_backend());
    let mut composer = PostComposer::new(backend.clone(), BUCKET, Some(viewer()));

    composer.open();
    assert!(composer.submit().await.is_err());
    assert_eq!(composer.error(), Some("Please add a title to your post"));

    composer.set_title("Only a title");
    assert!(composer.submit().await.is_err());
    assert_eq!(composer.error(), Some("Please add content to your post"));

    assert_eq!(backend.session_count(), 0);
    assert_eq!(backend.insert_count(), 0);
}

#[tokio::test]
async fn test_insert_failure_preserves_draft_for_retry() {
    let backend = Arc::new(signed_in_backend().fail_inserts_with("duplicate key value"));
    let mut composer = PostComposer::new(backend.clone(), BUCKET, Some(viewer()));

    composer.open();
    composer.set_title("Flaky insert");
    composer.set_content("Body");

    assert!(composer.submit().await.is_err());
    assert!(composer.is_open());
    assert_eq!(composer.error(), Some("duplicate key value"));
    assert_eq!(composer.draft().title, "Flaky insert");

    // Resubmitting issues another insert.
    assert!(composer.submit().await.is_err());
    assert_eq!(backend.insert_count(), 2);
}
