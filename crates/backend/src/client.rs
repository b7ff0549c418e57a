//! Backend client trait.

use async_trait::async_trait;
use earthie_common::AppResult;
use std::sync::Arc;

use crate::records::{NewPostRecord, PostRecord};
use crate::session::Session;

/// Client trait for the managed backend.
///
/// One object carries the three concerns the feature services touch: object
/// storage, the auth session, and the post row store. Services take a
/// [`SharedBackend`] so tests can swap in [`crate::MemoryBackend`].
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Upload bytes to a storage bucket under the given key.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<()>;

    /// Resolve the public URL of a stored object. Pure; issues no request.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Fetch the current authenticated session, if any.
    async fn get_session(&self) -> AppResult<Option<Session>>;

    /// Insert a post row and return it joined with the author profile and
    /// aggregate counts.
    async fn insert_returning(&self, record: NewPostRecord) -> AppResult<PostRecord>;
}

/// Type alias for a shared backend client handle.
pub type SharedBackend = Arc<dyn BackendClient>;
