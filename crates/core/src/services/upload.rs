//! Image upload service.
//!
//! Pushes selected files into the post bucket one at a time and resolves a
//! public URL for each stored object. Batches are strictly sequential: the
//! first failure aborts the files behind it, keeps the URLs already
//! appended to the draft, and leaves already-written objects in storage.

use chrono::Utc;
use rand::Rng;

use earthie_backend::SharedBackend;
use earthie_common::{AppError, AppResult};

use crate::services::composer::PostDraft;

/// Prefix on every generated storage key.
const KEY_PREFIX: &str = "post";

/// Length of the random suffix in generated storage keys.
const KEY_SUFFIX_LEN: usize = 6;

/// Shown when an upload fails without a message of its own.
const UPLOAD_FALLBACK_MESSAGE: &str = "Failed to upload image(s)";

/// A file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name; its extension carries over to the storage key.
    pub name: String,
    /// MIME type sent with the upload.
    pub content_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from a file name and its bytes, guessing the MIME
    /// type from the extension.
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name).to_string();
        Self {
            name,
            content_type,
            data,
        }
    }
}

/// Image upload service.
#[derive(Clone)]
pub struct UploadService {
    backend: SharedBackend,
    bucket: String,
}

impl UploadService {
    /// Create an upload service writing into `bucket`.
    pub fn new(backend: SharedBackend, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
        }
    }

    /// Upload files sequentially, appending each resolved public URL to the
    /// draft's image list as it completes.
    ///
    /// An empty batch is a no-op. On the first failure the remaining files
    /// are never attempted; URLs appended by earlier files stay on the
    /// draft and objects already written are not rolled back. Returns the
    /// number of URLs appended.
    pub async fn upload_to_draft(
        &self,
        draft: &mut PostDraft,
        files: &[UploadFile],
    ) -> AppResult<usize> {
        if files.is_empty() {
            return Ok(0);
        }

        let mut appended = 0;
        for file in files {
            let key = generate_storage_key(&file.name);

            tracing::debug!(
                bucket = %self.bucket,
                key = %key,
                name = %file.name,
                size = file.data.len(),
                "Uploading post image"
            );

            self.backend
                .upload(&self.bucket, &key, &file.data, &file.content_type)
                .await
                .map_err(upload_error)?;

            let url = self.backend.public_url(&self.bucket, &key);
            if draft.add_image_url(url) {
                appended += 1;
            }
        }

        tracing::debug!(appended, total = files.len(), "Upload batch finished");
        Ok(appended)
    }
}

/// Map a backend failure to the inline upload error.
fn upload_error(e: AppError) -> AppError {
    let message = e.user_message();
    if message.is_empty() {
        AppError::Upload(UPLOAD_FALLBACK_MESSAGE.to_string())
    } else {
        AppError::Upload(message.to_string())
    }
}

/// Generate a collision-resistant storage key that keeps the original
/// extension: `post-{unix_millis}-{random base36}.{ext}`.
fn generate_storage_key(original_name: &str) -> String {
    let extension = original_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(char::is_alphanumeric))
        .unwrap_or("bin");

    format!(
        "{KEY_PREFIX}-{}-{}.{extension}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

/// Random lowercase base36 suffix of [`KEY_SUFFIX_LEN`] characters.
fn random_suffix() -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut rng = rand::thread_rng();
    (0..KEY_SUFFIX_LEN)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect()
}

/// Guess a MIME type from a file name's extension.
#[must_use]
pub fn guess_content_type(name: &str) -> &'static str {
    match name.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use earthie_backend::MemoryBackend;

    use super::*;

    fn png(name: &str) -> UploadFile {
        UploadFile::new(name, vec![1, 2, 3])
    }

    #[test]
    fn test_storage_key_keeps_extension() {
        let key = generate_storage_key("earth2-raid.png");
        assert!(key.starts_with("post-"));
        assert!(key.ends_with(".png"));

        assert!(generate_storage_key("archive.tar.gz").ends_with(".gz"));
        assert!(generate_storage_key("noextension").ends_with(".bin"));
        assert!(generate_storage_key("trailing.").ends_with(".bin"));
        assert!(generate_storage_key("weird.d!r").ends_with(".bin"));
    }

    #[test]
    fn test_storage_key_suffix_shape() {
        let key = generate_storage_key("a.png");
        let suffix = key
            .rsplit('-')
            .next()
            .unwrap()
            .trim_end_matches(".png");
        assert_eq!(suffix.len(), KEY_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_storage_keys_differ_across_calls() {
        assert_ne!(generate_storage_key("a.png"), generate_storage_key("a.png"));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a.png"), "image/png");
        assert_eq!(guess_content_type("a.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("a.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("a.gif"), "image/gif");
        assert_eq!(guess_content_type("a.webp"), "image/webp");
        assert_eq!(guess_content_type("binary"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_noop() {
        let backend = Arc::new(MemoryBackend::new());
        let service = UploadService::new(backend.clone(), "lobbyist-posts");
        let mut draft = PostDraft::default();

        let appended = service.upload_to_draft(&mut draft, &[]).await.unwrap();

        assert_eq!(appended, 0);
        assert_eq!(backend.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_appends_urls_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        let service = UploadService::new(backend.clone(), "lobbyist-posts");
        let mut draft = PostDraft::default();
        draft.add_image_url("https://cdn.test/manual.png");

        let files = vec![png("a.png"), png("b.png")];
        let appended = service.upload_to_draft(&mut draft, &files).await.unwrap();

        assert_eq!(appended, 2);
        assert_eq!(draft.image_urls.len(), 3);
        assert_eq!(draft.image_urls[0], "https://cdn.test/manual.png");
        assert!(draft.image_urls[1].contains("/lobbyist-posts/post-"));
        assert!(draft.image_urls[1].ends_with(".png"));
        assert_eq!(backend.upload_count(), 2);
        assert_eq!(backend.object_count().await, 2);
    }

    #[tokio::test]
    async fn test_failure_aborts_batch_and_keeps_earlier_urls() {
        let backend = Arc::new(MemoryBackend::new().fail_upload_at(2));
        let service = UploadService::new(backend.clone(), "lobbyist-posts");
        let mut draft = PostDraft::default();

        let files = vec![png("a.png"), png("b.png"), png("c.png")];
        let result = service.upload_to_draft(&mut draft, &files).await;

        match result {
            Err(AppError::Upload(message)) => assert!(message.contains("upload failed")),
            other => panic!("Expected upload error, got {other:?}"),
        }
        // First URL stays appended; the third file was never attempted.
        assert_eq!(draft.image_urls.len(), 1);
        assert_eq!(backend.upload_count(), 2);
        assert_eq!(backend.object_count().await, 1);
    }
}
