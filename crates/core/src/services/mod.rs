//! Feature services.

pub mod composer;
pub mod map_preview;
pub mod post;
pub mod upload;

pub use composer::{PostComposer, PostDraft, SUB_LOBBIES, SubLobby, TITLE_MAX_CHARS};
pub use map_preview::{Coordinates, ErrorPanel, MapPreview, MapState};
pub use post::{LobbyPost, PostAuthor, PostService, ReactionCounts, SUBMIT_FALLBACK_MESSAGE};
pub use upload::{UploadFile, UploadService, guess_content_type};
