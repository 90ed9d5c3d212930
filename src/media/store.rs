/// Media store facade
use crate::{
    config::{MediaStoreConfig, ServerConfig},
    error::{AppError, AppResult},
    media::{disk::DiskMediaBackend, remote::RemoteMediaBackend, MediaBackend, MediaKind},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

/// A stored media object: the durable fetch URL plus the storage key kept
/// for later cleanup.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub url: String,
    pub key: String,
}

/// Media store holding the configured backend
pub struct MediaStore {
    backend: Arc<dyn MediaBackend>,
    upload_limit: usize,
    allowed_hosts: Vec<String>,
}

impl MediaStore {
    /// Create a media store from configuration
    pub fn new(config: &ServerConfig) -> Self {
        let backend: Arc<dyn MediaBackend> = match &config.storage.media {
            MediaStoreConfig::Disk { location } => {
                info!("media store: disk backend at {:?}", location);
                Arc::new(DiskMediaBackend::new(
                    location.clone(),
                    format!("{}/media", config.service.public_url),
                ))
            }
            MediaStoreConfig::Remote {
                endpoint,
                access_key,
            } => {
                info!("media store: remote backend at {}", endpoint);
                Arc::new(RemoteMediaBackend::new(
                    endpoint.clone(),
                    access_key.clone(),
                ))
            }
        };

        Self {
            backend,
            upload_limit: config.service.upload_limit,
            allowed_hosts: config.storage.allowed_image_hosts.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_backend(backend: Arc<dyn MediaBackend>, upload_limit: usize) -> Self {
        Self {
            backend,
            upload_limit,
            allowed_hosts: Vec::new(),
        }
    }

    /// Upload a payload under a folder namespace and return its durable URL.
    ///
    /// Keys are content-addressed (SHA-256 of the payload) so re-uploading
    /// identical bytes lands on the same object.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        content_type: Option<&str>,
        folder: &str,
        kind: MediaKind,
    ) -> AppResult<StoredMedia> {
        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if data.len() > self.upload_limit {
            return Err(AppError::Validation(format!(
                "Uploaded file exceeds the {} byte limit",
                self.upload_limit
            )));
        }

        let digest = hex::encode(Sha256::digest(&data));
        let key = format!("{}/{}.{}", folder, digest, kind.extension(content_type));
        let stored_type = kind.effective_content_type(content_type);

        let url = self.backend.put(&key, data, stored_type).await?;

        if kind == MediaKind::Image {
            self.check_host(&url)?;
        }

        Ok(StoredMedia { url, key })
    }

    /// Retrieve a payload for serving; `None` when the backend's store
    /// serves fetches itself or the key is unknown.
    pub async fn fetch(&self, key: &str) -> AppResult<Option<(Vec<u8>, String)>> {
        self.backend.fetch(key).await
    }

    /// Delete a stored object. Callers treat failures as best-effort.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.backend.delete(key).await
    }

    /// Reject durable image URLs pointing outside the allowed host patterns.
    fn check_host(&self, url: &str) -> AppResult<()> {
        if self.allowed_hosts.is_empty() {
            return Ok(());
        }

        let host = host_of(url);
        let allowed = self.allowed_hosts.iter().any(|pattern| {
            host == pattern.as_str()
                || (pattern.starts_with('.') && host.ends_with(pattern.as_str()))
        });

        if allowed {
            Ok(())
        } else {
            Err(AppError::MediaStorage(format!(
                "Store returned URL on disallowed host: {}",
                host
            )))
        }
    }
}

/// Host portion of an http(s) URL
fn host_of(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let end = rest.find(['/', ':', '?']).unwrap_or(rest.len());
    &rest[..end]
}
