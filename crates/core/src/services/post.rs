//! Post submission service.
//!
//! Validates the draft, resolves the live session, inserts the post row,
//! and maps the returned row (joined with the author profile and aggregate
//! counts) into the UI-facing post shape.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use earthie_backend::{NewPostRecord, PostRecord, PostType, SharedBackend, UserProfile};
use earthie_common::{AppError, AppResult};

use crate::services::composer::PostDraft;

/// Shown when the draft has no title.
const TITLE_REQUIRED_MESSAGE: &str = "Please add a title to your post";

/// Shown when the draft has no body.
const CONTENT_REQUIRED_MESSAGE: &str = "Please add content to your post";

/// Shown when the page knows no viewer identity.
const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to create a post.";

/// Shown when no live session can be resolved.
const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// Shown when a submission fails without a message of its own.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to create post. Please try again.";

/// Display name used when the author has no usable profile.
const MISSING_PROFILE_NAME: &str = "Earth2 Profile Required";

/// Generated-avatar endpoint; seeding keeps placeholder avatars stable per
/// username.
const AVATAR_PLACEHOLDER_BASE: &str = "https://api.dicebear.com/7.x/initials/svg";

/// Avatar seed used when the author has no username.
const DEFAULT_AVATAR_SEED: &str = "anonymous";

/// A submitted post in the shape the lobby UI renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPost {
    /// Server-assigned post id.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Post type.
    pub post_type: PostType,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Tags, in insertion order.
    pub tags: Vec<String>,
    /// Attached image URLs, in insertion order.
    pub images: Vec<String>,
    /// Author summary.
    pub user: PostAuthor,
    /// Reaction counters, zeroed on a fresh post.
    pub reactions: ReactionCounts,
    /// Comment count, zero on a fresh post.
    pub comment_count: i64,
    /// Echo count, zero on a fresh post.
    pub echo_count: i64,
}

/// Author summary attached to a submitted post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    /// Author user id.
    pub id: String,
    /// Display name, with a fixed placeholder when no profile is usable.
    pub name: String,
    /// Avatar URL, with a generated placeholder when none is set.
    pub avatar: String,
    /// Whether a profile row was joined for the author.
    pub has_profile: bool,
}

/// Per-kind reaction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReactionCounts {
    /// `hyped` reactions.
    pub hyped: u32,
    /// `smart` reactions.
    pub smart: u32,
    /// `love` reactions.
    pub love: u32,
    /// `watching` reactions.
    pub watching: u32,
}

/// Post submission service.
#[derive(Clone)]
pub struct PostService {
    backend: SharedBackend,
}

impl PostService {
    /// Create a post service over the given backend.
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Validate the draft, resolve the live session, and insert the post.
    ///
    /// Checks run in a fixed order so the dialog always surfaces the same
    /// message for the same gap: title, then body, then viewer identity,
    /// then the live session. No backend call is made before the local
    /// checks pass.
    pub async fn create(
        &self,
        viewer: Option<&UserProfile>,
        draft: &PostDraft,
    ) -> AppResult<LobbyPost> {
        if draft.title.trim().is_empty() {
            return Err(AppError::Validation(TITLE_REQUIRED_MESSAGE.to_string()));
        }
        if draft.content.trim().is_empty() {
            return Err(AppError::Validation(CONTENT_REQUIRED_MESSAGE.to_string()));
        }
        if viewer.is_none() {
            return Err(AppError::Unauthorized(LOGIN_REQUIRED_MESSAGE.to_string()));
        }

        let session = match self.backend.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                return Err(AppError::Unauthorized(AUTH_REQUIRED_MESSAGE.to_string()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed during post submit");
                return Err(AppError::Unauthorized(AUTH_REQUIRED_MESSAGE.to_string()));
            }
        };

        let record = NewPostRecord {
            title: draft.title.clone(),
            content: draft.content.clone(),
            post_type: draft.post_type,
            tags: draft.tags.clone(),
            image_urls: draft.image_urls.clone(),
            sub_lobby: draft.sub_lobby.clone().unwrap_or_default(),
            is_private: draft.is_private,
            followers_only: draft.followers_only,
            user_id: session.user.id.clone(),
        };
        record.validate()?;

        tracing::debug!(
            user_id = %record.user_id,
            post_type = record.post_type.as_str(),
            images = record.image_urls.len(),
            "Inserting lobbyist post"
        );

        let row = self.backend.insert_returning(record).await?;
        Ok(map_post(row))
    }
}

/// Map a returned row into the UI-facing post shape.
///
/// Counters are zeroed regardless of the joined aggregates; a fresh post
/// has no reactions or comments yet, whatever the join happens to return.
fn map_post(row: PostRecord) -> LobbyPost {
    let username = row
        .profiles
        .as_ref()
        .and_then(|p| p.username.as_deref())
        .filter(|u| !u.is_empty());

    let avatar = row
        .profiles
        .as_ref()
        .and_then(|p| p.avatar_url.as_deref())
        .filter(|a| !a.is_empty())
        .map_or_else(|| placeholder_avatar(username), str::to_string);

    let user = PostAuthor {
        id: row.user_id,
        name: username.unwrap_or(MISSING_PROFILE_NAME).to_string(),
        avatar,
        has_profile: row.profiles.is_some(),
    };

    LobbyPost {
        id: row.id,
        title: row.title,
        content: row.content,
        post_type: row.post_type,
        created_at: row.created_at,
        tags: row.tags.unwrap_or_default(),
        images: row.image_urls.unwrap_or_default(),
        user,
        reactions: ReactionCounts::default(),
        comment_count: 0,
        echo_count: 0,
    }
}

/// Deterministic placeholder avatar for authors without one.
fn placeholder_avatar(username: Option<&str>) -> String {
    let seed = username.unwrap_or(DEFAULT_AVATAR_SEED);
    format!("{AVATAR_PLACEHOLDER_BASE}?seed={seed}")
}
