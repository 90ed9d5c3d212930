/// Disk-based media storage backend
use crate::{
    error::{AppError, AppResult},
    media::MediaBackend,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Stores payloads on the local filesystem under their folder-namespaced
/// keys and mints durable URLs served by this service's `/media` route.
#[derive(Clone)]
pub struct DiskMediaBackend {
    base_path: PathBuf,
    public_base: String,
}

impl DiskMediaBackend {
    /// Create a new disk storage backend.
    ///
    /// `public_base` is the URL prefix under which stored keys are served,
    /// e.g. `http://localhost:8700/media`.
    pub fn new(base_path: PathBuf, public_base: String) -> Self {
        Self {
            base_path,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    /// File path for a key. Keys are relative folder paths
    /// (e.g. `books/covers/<digest>.png`); path traversal is rejected.
    fn object_path(&self, key: &str) -> AppResult<PathBuf> {
        if key.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(AppError::MediaStorage(format!("Invalid media key: {}", key)));
        }
        Ok(self.base_path.join(key))
    }

    /// Content type derived from the key's extension
    fn content_type_for(key: &str) -> &'static str {
        match key.rsplit('.').next() {
            Some("pdf") => "application/pdf",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl MediaBackend for DiskMediaBackend {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> AppResult<String> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::MediaStorage(format!("Failed to create media directory: {}", e))
            })?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::MediaStorage(format!("Failed to write media {}: {}", key, e)))?;

        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn fetch(&self, key: &str) -> AppResult<Option<(Vec<u8>, String)>> {
        let path = self.object_path(key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Some((data, Self::content_type_for(key).to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::MediaStorage(format!(
                "Failed to read media {}: {}",
                key, e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.object_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::MediaStorage(format!(
                "Failed to delete media {}: {}",
                key, e
            ))),
        }
    }
}
