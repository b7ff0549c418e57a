//! Wire records for the post row store.
//!
//! These are the typed shapes that cross the backend boundary: the row sent
//! on insert and the row returned back joined with the author profile and
//! aggregate counts. Deserialization is the validation point for data coming
//! in from outside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kind of lobbyist post being composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    /// Plain text post.
    #[default]
    Text,
    /// Image post.
    Image,
    /// Trade offer.
    Trade,
    /// Poll.
    Poll,
    /// Developer diary.
    DevDiary,
    /// Raid call.
    Raid,
    /// Showcase.
    Showcase,
}

impl PostType {
    /// All post types, in picker display order.
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Image,
        Self::Trade,
        Self::Poll,
        Self::DevDiary,
        Self::Raid,
        Self::Showcase,
    ];

    /// Stable identifier used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Trade => "trade",
            Self::Poll => "poll",
            Self::DevDiary => "dev_diary",
            Self::Raid => "raid",
            Self::Showcase => "showcase",
        }
    }

    /// Human-readable label for pickers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Trade => "Trade Offer",
            Self::Poll => "Poll",
            Self::DevDiary => "Dev Diary",
            Self::Raid => "Raid",
            Self::Showcase => "Showcase",
        }
    }

    /// Parse a wire identifier back into a post type.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == id)
    }
}

/// Row inserted into the `lobbyist_posts` table.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewPostRecord {
    /// Post title.
    #[validate(length(min = 1, max = 140))]
    pub title: String,
    /// Post body.
    #[validate(length(min = 1))]
    pub content: String,
    /// Post type identifier.
    pub post_type: PostType,
    /// Tags, in insertion order.
    pub tags: Vec<String>,
    /// Public image URLs, in insertion order.
    pub image_urls: Vec<String>,
    /// Sub-lobby the post is filed under; empty when unfiled.
    pub sub_lobby: String,
    /// Whether the post is private.
    pub is_private: bool,
    /// Whether the post is visible to followers only.
    pub followers_only: bool,
    /// Author user id, taken from the live session.
    pub user_id: String,
}

/// Row returned from a post insert, joined with the author profile and
/// aggregate counts.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    /// Server-assigned post id.
    pub id: String,
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Post type identifier.
    pub post_type: PostType,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Tags; absent on legacy rows.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Image URLs; absent on legacy rows.
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    /// Sub-lobby the post is filed under.
    #[serde(default)]
    pub sub_lobby: Option<String>,
    /// Whether the post is private.
    #[serde(default)]
    pub is_private: bool,
    /// Whether the post is visible to followers only.
    #[serde(default)]
    pub followers_only: bool,
    /// Author user id.
    pub user_id: String,
    /// Joined author profile; `None` when the author has not created one.
    #[serde(default)]
    pub profiles: Option<ProfileRecord>,
    /// Joined reaction rows.
    #[serde(default)]
    pub reactions: Vec<ReactionRecord>,
    /// Joined comment aggregates.
    #[serde(default)]
    pub comments: Vec<CommentAggregate>,
}

/// Joined author profile row.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
    /// Profile id.
    pub id: String,
    /// Username; may be unset on incomplete profiles.
    #[serde(default)]
    pub username: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One joined reaction row.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionRecord {
    /// Reaction kind identifier (e.g. `hyped`).
    pub reaction_type: String,
}

/// Joined comment aggregate.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAggregate {
    /// Number of comments.
    pub count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_type_wire_ids() {
        assert_eq!(PostType::DevDiary.as_str(), "dev_diary");
        assert_eq!(PostType::from_id("trade"), Some(PostType::Trade));
        assert_eq!(PostType::from_id("unknown"), None);
        assert_eq!(PostType::Trade.label(), "Trade Offer");

        let json = serde_json::to_value(PostType::DevDiary).unwrap();
        assert_eq!(json, serde_json::json!("dev_diary"));
    }

    #[test]
    fn test_new_post_record_serializes_wire_fields() {
        let record = NewPostRecord {
            title: "Hello".to_string(),
            content: "World".to_string(),
            post_type: PostType::Showcase,
            tags: vec!["e2".to_string()],
            image_urls: vec![],
            sub_lobby: "sl1".to_string(),
            is_private: false,
            followers_only: true,
            user_id: "user-1".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["post_type"], "showcase");
        assert_eq!(json["sub_lobby"], "sl1");
        assert_eq!(json["followers_only"], true);
        assert_eq!(json["user_id"], "user-1");
    }

    #[test]
    fn test_new_post_record_enforces_title_cap() {
        let record = NewPostRecord {
            title: "x".repeat(141),
            content: "body".to_string(),
            post_type: PostType::Text,
            tags: vec![],
            image_urls: vec![],
            sub_lobby: String::new(),
            is_private: false,
            followers_only: false,
            user_id: "user-1".to_string(),
        };

        assert!(record.validate().is_err());
    }

    #[test]
    fn test_post_record_from_join_payload() {
        let payload = serde_json::json!({
            "id": "post-1",
            "title": "Sold my megacity tile",
            "content": "Details inside",
            "post_type": "trade",
            "created_at": "2026-08-21T10:30:00+00:00",
            "tags": ["trade", "e2"],
            "image_urls": ["https://cdn.test/a.png"],
            "sub_lobby": "sl3",
            "is_private": false,
            "followers_only": false,
            "user_id": "user-1",
            "profiles": {
                "id": "user-1",
                "username": "terra",
                "avatar_url": null
            },
            "reactions": [{"reaction_type": "hyped"}, {"reaction_type": "love"}],
            "comments": [{"count": 4}]
        });

        let record: PostRecord = serde_json::from_value(payload).unwrap();
        assert_eq!(record.post_type, PostType::Trade);
        assert_eq!(record.tags.as_deref(), Some(["trade".to_string(), "e2".to_string()].as_slice()));
        assert_eq!(record.profiles.as_ref().unwrap().username.as_deref(), Some("terra"));
        assert_eq!(record.reactions.len(), 2);
        assert_eq!(record.comments[0].count, 4);
    }

    #[test]
    fn test_post_record_tolerates_nulls_and_missing_joins() {
        let payload = serde_json::json!({
            "id": "post-2",
            "title": "No profile yet",
            "content": "body",
            "post_type": "text",
            "created_at": "2026-08-21T10:30:00+00:00",
            "tags": null,
            "image_urls": null,
            "user_id": "user-2",
            "profiles": null
        });

        let record: PostRecord = serde_json::from_value(payload).unwrap();
        assert!(record.tags.is_none());
        assert!(record.image_urls.is_none());
        assert!(record.profiles.is_none());
        assert!(record.reactions.is_empty());
        assert!(record.comments.is_empty());
    }
}
