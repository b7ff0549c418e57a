//! Lobbyist post composer.
//!
//! Dialog-scoped state for the create-post flow: the draft being written,
//! the open flag, and the two inline error strings the dialog renders. The
//! composer owns an [`UploadService`] and a [`PostService`] and delegates
//! the actual work to them; everything here is transient and resets when
//! the dialog closes.

use earthie_backend::{PostType, SharedBackend, UserProfile};
use earthie_common::{AppError, AppResult};

use crate::services::post::{LobbyPost, PostService, SUBMIT_FALLBACK_MESSAGE};
use crate::services::upload::{UploadFile, UploadService};

/// Maximum title length; longer input is truncated at entry.
pub const TITLE_MAX_CHARS: usize = 140;

/// A sub-lobby a post can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubLobby {
    /// Stable id stored on the post row.
    pub id: &'static str,
    /// Display name shown in the picker.
    pub name: &'static str,
}

/// Sub-lobbies offered by the composer picker, in display order.
pub const SUB_LOBBIES: [SubLobby; 5] = [
    SubLobby { id: "sl1", name: "Showcase" },
    SubLobby { id: "sl2", name: "RaidHQ" },
    SubLobby { id: "sl3", name: "Markets" },
    SubLobby { id: "sl4", name: "Ideas" },
    SubLobby { id: "sl5", name: "Drama" },
];

impl SubLobby {
    /// Look up a sub-lobby by id.
    #[must_use]
    pub fn find(id: &str) -> Option<Self> {
        SUB_LOBBIES.into_iter().find(|lobby| lobby.id == id)
    }
}

/// An in-memory draft of a lobbyist post.
///
/// Field-entry rules live here: the title is truncated to
/// [`TITLE_MAX_CHARS`], tags are whitespace-stripped and deduplicated, and
/// the image list rejects duplicates. Everything starts empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Title, at most [`TITLE_MAX_CHARS`] characters.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Kind of post being composed.
    pub post_type: PostType,
    /// Sub-lobby the post is filed under, if any.
    pub sub_lobby: Option<String>,
    /// Tags, unique and whitespace-free, in insertion order.
    pub tags: Vec<String>,
    /// Attached image URLs, unique, in insertion order.
    pub image_urls: Vec<String>,
    /// Whether the post is private.
    pub is_private: bool,
    /// Whether the post is visible to followers only.
    pub followers_only: bool,
}

impl PostDraft {
    /// Set the title, keeping at most [`TITLE_MAX_CHARS`] characters.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.chars().take(TITLE_MAX_CHARS).collect();
    }

    /// Add a tag with all whitespace stripped.
    ///
    /// Ignored when the stripped tag is empty or already present. Returns
    /// whether the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag: String = tag.chars().filter(|c| !c.is_whitespace()).collect();
        if tag.is_empty() || self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag by value.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Append an image URL, ignoring empty strings and duplicates.
    ///
    /// Returns whether the URL was appended.
    pub fn add_image_url(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if url.is_empty() || self.image_urls.contains(&url) {
            return false;
        }
        self.image_urls.push(url);
        true
    }

    /// Remove an image URL by value.
    pub fn remove_image_url(&mut self, url: &str) {
        self.image_urls.retain(|u| u != url);
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Dialog-scoped controller for composing lobbyist posts.
pub struct PostComposer {
    uploads: UploadService,
    posts: PostService,
    viewer: Option<UserProfile>,
    draft: PostDraft,
    open: bool,
    error: Option<String>,
    upload_error: Option<String>,
}

impl PostComposer {
    /// Create a composer backed by `backend`, uploading images into
    /// `bucket`. `viewer` is the signed-in identity known to the page, if
    /// any.
    #[must_use]
    pub fn new(
        backend: SharedBackend,
        bucket: impl Into<String>,
        viewer: Option<UserProfile>,
    ) -> Self {
        Self {
            uploads: UploadService::new(backend.clone(), bucket),
            posts: PostService::new(backend),
            viewer,
            draft: PostDraft::default(),
            open: false,
            error: None,
            upload_error: None,
        }
    }

    /// Open the dialog. An existing draft is kept as-is.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the dialog, discarding the draft and both error strings.
    pub fn close(&mut self) {
        self.open = false;
        self.draft.reset();
        self.error = None;
        self.upload_error = None;
    }

    /// Whether the dialog is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// The draft being composed.
    #[must_use]
    pub const fn draft(&self) -> &PostDraft {
        &self.draft
    }

    /// The signed-in identity the composer was created with, if any.
    #[must_use]
    pub const fn viewer(&self) -> Option<&UserProfile> {
        self.viewer.as_ref()
    }

    /// Inline error from the last failed submit.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Inline error from the last failed upload batch.
    #[must_use]
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Set the title, keeping at most [`TITLE_MAX_CHARS`] characters.
    pub fn set_title(&mut self, title: &str) {
        self.draft.set_title(title);
    }

    /// Set the body text.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.draft.content = content.into();
    }

    /// Set the post type.
    pub fn set_post_type(&mut self, post_type: PostType) {
        self.draft.post_type = post_type;
    }

    /// File the post under a sub-lobby, or unfile it.
    pub fn set_sub_lobby(&mut self, sub_lobby: Option<String>) {
        self.draft.sub_lobby = sub_lobby;
    }

    /// Add a tag to the draft. See [`PostDraft::add_tag`].
    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.draft.add_tag(tag)
    }

    /// Remove a tag by value.
    pub fn remove_tag(&mut self, tag: &str) {
        self.draft.remove_tag(tag);
    }

    /// Attach an already-hosted image URL. See [`PostDraft::add_image_url`].
    pub fn add_image_url(&mut self, url: impl Into<String>) -> bool {
        self.draft.add_image_url(url)
    }

    /// Detach an image URL by value.
    pub fn remove_image_url(&mut self, url: &str) {
        self.draft.remove_image_url(url);
    }

    /// Mark the post private.
    pub fn set_private(&mut self, is_private: bool) {
        self.draft.is_private = is_private;
    }

    /// Restrict the post to followers.
    pub fn set_followers_only(&mut self, followers_only: bool) {
        self.draft.followers_only = followers_only;
    }

    /// Upload a batch of files and attach their public URLs to the draft.
    ///
    /// Files go up strictly in order; the first failure aborts the rest of
    /// the batch. URLs appended by earlier files stay on the draft and
    /// their objects stay in storage. Returns the number of URLs appended.
    pub async fn upload_images(&mut self, files: &[UploadFile]) -> AppResult<usize> {
        self.upload_error = None;

        match self.uploads.upload_to_draft(&mut self.draft, files).await {
            Ok(appended) => Ok(appended),
            Err(e) => {
                self.upload_error = Some(e.user_message().to_string());
                Err(e)
            }
        }
    }

    /// Submit the draft as a new lobbyist post.
    ///
    /// On success the dialog closes, the draft resets, and the created post
    /// is returned. On failure the inline error is set and the dialog stays
    /// open with the draft intact so the author can retry.
    pub async fn submit(&mut self) -> AppResult<LobbyPost> {
        self.error = None;

        match self.posts.create(self.viewer.as_ref(), &self.draft).await {
            Ok(post) => {
                tracing::info!(post_id = %post.id, "Lobbyist post created");
                self.close();
                Ok(post)
            }
            Err(e) => {
                let message = e.user_message();
                self.error = Some(if message.is_empty() {
                    SUBMIT_FALLBACK_MESSAGE.to_string()
                } else {
                    message.to_string()
                });
                Err(e)
            }
        }
    }

    /// Save the draft for later.
    ///
    /// Not wired up yet; always returns an unsupported-operation error.
    pub fn save_draft(&self) -> AppResult<()> {
        Err(AppError::Unsupported(
            "Saving drafts is not implemented yet".to_string(),
        ))
    }
}
