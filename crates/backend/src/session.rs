//! Session and identity types.

use serde::{Deserialize, Serialize};

/// An authenticated backend session.
///
/// Sessions are issued by the managed auth service; this crate only carries
/// them. The bearer token authorizes storage and row-store requests, and the
/// user id becomes the author id of submitted posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented to the backend.
    pub access_token: String,
    /// The user this session belongs to.
    pub user: SessionUser,
}

impl Session {
    /// Create a session from a token and user id.
    #[must_use]
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user: SessionUser {
                id: user_id.into(),
                email: None,
            },
        }
    }
}

/// The user a session was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend user id.
    pub id: String,
    /// Email address, when the auth service exposes it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Identity summary of the viewer composing a post.
///
/// This is caller-supplied display data, distinct from [`Session`]: a viewer
/// can be known to the page without holding a live session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend user id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// Two-character uppercase initials shown when no avatar image is set.
    ///
    /// Prefers the display name, then the username; `--` when neither is
    /// available.
    #[must_use]
    pub fn initials(&self) -> String {
        let display = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.username.as_deref().filter(|u| !u.is_empty()));

        display.map_or_else(
            || "--".to_string(),
            |n| n.chars().take(2).collect::<String>().to_uppercase(),
        )
    }
}
