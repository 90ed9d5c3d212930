/// Remote HTTP object-store backend
use crate::{
    error::{AppError, AppResult},
    media::MediaBackend,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Remote media backend
///
/// Forwards payloads to an external object store over HTTP. The store is
/// expected to accept a raw body at `POST {endpoint}/{key}` and answer with
/// a JSON document carrying the durable fetch URL.
#[derive(Clone)]
pub struct RemoteMediaBackend {
    client: reqwest::Client,
    endpoint: String,
    access_key: String,
}

/// Upload response from the object store
#[derive(Debug, Deserialize)]
struct UploadResult {
    url: String,
}

impl RemoteMediaBackend {
    /// Create a new remote backend
    pub fn new(endpoint: String, access_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_key,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint, key)
    }
}

#[async_trait]
impl MediaBackend for RemoteMediaBackend {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String> {
        debug!(
            "uploading media to object store: {} ({} bytes, type: {})",
            key,
            data.len(),
            content_type
        );

        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.access_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                error!("object store unreachable: {}", e);
                AppError::MediaStorage(format!("Upload failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::MediaStorage(format!(
                "Object store rejected upload of {}: {}",
                key,
                response.status()
            )));
        }

        let result: UploadResult = response.json().await.map_err(|e| {
            AppError::MediaStorage(format!("Malformed object store response: {}", e))
        })?;

        debug!("media uploaded: {} -> {}", key, result.url);
        Ok(result.url)
    }

    async fn fetch(&self, _key: &str) -> AppResult<Option<(Vec<u8>, String)>> {
        // The store serves its own durable URLs; nothing to proxy.
        Ok(None)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.access_key)
            .send()
            .await
            .map_err(|e| AppError::MediaStorage(format!("Delete failed: {}", e)))?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::MediaStorage(format!(
                "Object store rejected delete of {}: {}",
                key,
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_urls_join_cleanly() {
        let backend = RemoteMediaBackend::new(
            "https://store.example.com/v1/".to_string(),
            "key".to_string(),
        );
        assert_eq!(
            backend.object_url("books/covers/abc.png"),
            "https://store.example.com/v1/books/covers/abc.png"
        );
    }
}
