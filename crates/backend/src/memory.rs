//! In-memory backend for tests and offline development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use earthie_common::{AppError, AppResult};

use crate::client::BackendClient;
use crate::records::{CommentAggregate, NewPostRecord, PostRecord, ProfileRecord, ReactionRecord};
use crate::session::Session;

/// An object held by the in-memory store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Raw bytes.
    pub data: Vec<u8>,
    /// Content type supplied at upload.
    pub content_type: String,
}

/// In-memory fake of the managed backend.
///
/// Records uploads, serves deterministic public URLs, holds a configurable
/// session, and echoes inserted rows back with a configurable profile and
/// aggregate join. Failures can be injected per operation, and call counters
/// let tests assert that an aborted flow issued no further requests.
pub struct MemoryBackend {
    base_url: String,
    session: Option<Session>,
    profile: Option<ProfileRecord>,
    reactions: Vec<ReactionRecord>,
    comments: Vec<CommentAggregate>,
    fail_upload_at: Option<usize>,
    fail_session: bool,
    insert_failure: Option<String>,
    objects: RwLock<HashMap<String, StoredObject>>,
    posts: RwLock<Vec<PostRecord>>,
    upload_calls: AtomicUsize,
    session_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty in-memory backend with no session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: "https://backend.test".to_string(),
            session: None,
            profile: None,
            reactions: Vec::new(),
            comments: Vec::new(),
            fail_upload_at: None,
            fail_session: false,
            insert_failure: None,
            objects: RwLock::new(HashMap::new()),
            posts: RwLock::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
            session_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
        }
    }

    /// Hold a session that `get_session` returns.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach a profile row to every inserted post.
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileRecord) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Attach reaction rows and comment aggregates to every inserted post.
    #[must_use]
    pub fn with_aggregates(
        mut self,
        reactions: Vec<ReactionRecord>,
        comments: Vec<CommentAggregate>,
    ) -> Self {
        self.reactions = reactions;
        self.comments = comments;
        self
    }

    /// Fail the nth upload call (1-based).
    #[must_use]
    pub const fn fail_upload_at(mut self, call: usize) -> Self {
        self.fail_upload_at = Some(call);
        self
    }

    /// Fail every session lookup.
    #[must_use]
    pub const fn fail_session_lookups(mut self) -> Self {
        self.fail_session = true;
        self
    }

    /// Fail every insert with the given message.
    #[must_use]
    pub fn fail_inserts_with(mut self, message: impl Into<String>) -> Self {
        self.insert_failure = Some(message.into());
        self
    }

    /// Number of upload calls made, including failed ones.
    #[must_use]
    pub fn upload_count(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Number of session lookups made.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    /// Number of insert calls made, including failed ones.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Fetch a stored object.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(&object_key(bucket, key)).cloned()
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// All rows inserted so far.
    pub async fn inserted_posts(&self) -> Vec<PostRecord> {
        self.posts.read().await.clone()
    }
}

fn object_key(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

#[async_trait]
impl BackendClient for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<()> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_upload_at == Some(call) {
            return Err(AppError::ExternalService(
                "Storage upload failed".to_string(),
            ));
        }

        self.objects.write().await.insert(
            object_key(bucket, key),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base_url)
    }

    async fn get_session(&self) -> AppResult<Option<Session>> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_session {
            return Err(AppError::ExternalService(
                "Session lookup failed".to_string(),
            ));
        }

        Ok(self.session.clone())
    }

    async fn insert_returning(&self, record: NewPostRecord) -> AppResult<PostRecord> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.insert_failure {
            return Err(AppError::ExternalService(message.clone()));
        }

        let row = PostRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: record.title,
            content: record.content,
            post_type: record.post_type,
            created_at: Utc::now(),
            tags: Some(record.tags),
            image_urls: Some(record.image_urls),
            sub_lobby: Some(record.sub_lobby),
            is_private: record.is_private,
            followers_only: record.followers_only,
            user_id: record.user_id,
            profiles: self.profile.clone(),
            reactions: self.reactions.clone(),
            comments: self.comments.clone(),
        };

        self.posts.write().await.push(row.clone());

        Ok(row)
    }
}
