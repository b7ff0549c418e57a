//! REST implementation of the backend client.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use earthie_common::{AppError, AppResult, BackendConfig};

use crate::client::BackendClient;
use crate::records::{NewPostRecord, PostRecord};
use crate::session::Session;

/// Table that lobbyist posts are stored in.
const POSTS_TABLE: &str = "lobbyist_posts";

/// Columns requested back from a post insert: the row itself, the author's
/// profile, and the joined reaction/comment aggregates.
const POST_SELECT: &str =
    "*,profiles(id,username,avatar_url),reactions:lobbyist_reactions(reaction_type),comments:lobbyist_comments(count)";

/// Request timeout for backend calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for a Supabase-style managed backend.
///
/// Never performs authentication itself: a session issued elsewhere is placed
/// in the client's session slot and presented as a bearer token. Without a
/// session, requests fall back to the project API key.
#[derive(Clone)]
pub struct RestBackend {
    config: BackendConfig,
    http_client: reqwest::Client,
    session: Arc<RwLock<Option<Session>>>,
}

impl RestBackend {
    /// Create a new REST backend client.
    pub fn new(config: BackendConfig) -> AppResult<Self> {
        url::Url::parse(&config.url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL '{}': {e}", config.url)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a new REST backend client holding a pre-issued session.
    pub fn with_session(config: BackendConfig, session: Session) -> AppResult<Self> {
        let backend = Self::new(config)?;
        Ok(Self {
            session: Arc::new(RwLock::new(Some(session))),
            ..backend
        })
    }

    /// Replace the held session.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    async fn bearer(&self) -> String {
        self.session
            .read()
            .await
            .as_ref()
            .map_or_else(|| self.config.anon_key.clone(), |s| s.access_token.clone())
    }
}

#[async_trait]
impl BackendClient for RestBackend {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<()> {
        let url = format!("{}/storage/v1/object/{bucket}/{key}", self.base());
        let bearer = self.bearer().await;

        tracing::debug!(bucket = %bucket, key = %key, size = data.len(), "Uploading object");

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Storage upload request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Storage API error: {status} - {body}"
            )));
        }

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{key}", self.base())
    }

    async fn get_session(&self) -> AppResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn insert_returning(&self, record: NewPostRecord) -> AppResult<PostRecord> {
        let url = format!("{}/rest/v1/{POSTS_TABLE}", self.base());
        let bearer = self.bearer().await;

        tracing::debug!(post_type = record.post_type.as_str(), "Inserting post row");

        let response = self
            .http_client
            .post(&url)
            .query(&[("select", POST_SELECT)])
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(&record)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Backend insert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Backend API error: {status} - {body}"
            )));
        }

        response
            .json::<PostRecord>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse post row: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> BackendConfig {
        BackendConfig {
            url: "https://project.supabase.test".to_string(),
            anon_key: "anon-key".to_string(),
        }
    }

    #[test]
    fn test_public_url_format() {
        let backend = RestBackend::new(test_config()).unwrap();
        assert_eq!(
            backend.public_url("lobbyist-posts", "post-1-abcdef.png"),
            "https://project.supabase.test/storage/v1/object/public/lobbyist-posts/post-1-abcdef.png"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = RestBackend::new(BackendConfig {
            url: "https://project.supabase.test/".to_string(),
            anon_key: "anon-key".to_string(),
        })
        .unwrap();
        assert_eq!(
            backend.public_url("b", "k"),
            "https://project.supabase.test/storage/v1/object/public/b/k"
        );
    }

    #[test]
    fn test_rejects_malformed_base_url() {
        let result = RestBackend::new(BackendConfig {
            url: "not a url".to_string(),
            anon_key: "anon-key".to_string(),
        });

        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("Invalid backend URL")),
            _ => panic!("Expected config error"),
        }
    }

    #[tokio::test]
    async fn test_session_slot_round_trip() {
        let backend = RestBackend::new(test_config()).unwrap();
        assert!(backend.get_session().await.unwrap().is_none());

        backend
            .set_session(Some(Session::new("token", "user-1")))
            .await;

        let session = backend.get_session().await.unwrap().unwrap();
        assert_eq!(session.user.id, "user-1");
        assert_eq!(session.access_token, "token");
    }
}
