/// Media storage system
///
/// Forwards cover images and book documents to an object store and hands
/// back durable fetch URLs. Supports multiple backend implementations
/// (disk, remote HTTP store).

pub mod disk;
pub mod remote;
pub mod store;

pub use store::{MediaStore, StoredMedia};

use crate::error::AppResult;
use async_trait::async_trait;

/// Resource kind of an uploaded payload.
///
/// Documents are tagged as generic binary with an explicit `.pdf` extension
/// so retrieval serves them with correct content semantics; images keep
/// their declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    /// File extension for a stored object of this kind
    pub fn extension(&self, content_type: Option<&str>) -> &'static str {
        match self {
            MediaKind::Document => "pdf",
            MediaKind::Image => match content_type {
                Some("image/png") => "png",
                Some("image/jpeg") => "jpg",
                Some("image/gif") => "gif",
                Some("image/webp") => "webp",
                Some("image/svg+xml") => "svg",
                _ => "bin",
            },
        }
    }

    /// Content type the object is stored and served under
    pub fn effective_content_type<'a>(&self, declared: Option<&'a str>) -> &'a str {
        match self {
            MediaKind::Document => "application/pdf",
            MediaKind::Image => declared.unwrap_or("application/octet-stream"),
        }
    }
}

/// Media storage backend trait
///
/// Implementations handle the actual storage and retrieval of payloads.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Store a payload under `key` and return its durable fetch URL
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> AppResult<String>;

    /// Retrieve a payload by key, with its content type.
    ///
    /// Backends whose store serves fetches itself return `None`.
    async fn fetch(&self, key: &str) -> AppResult<Option<(Vec<u8>, String)>>;

    /// Delete a payload by key
    async fn delete(&self, key: &str) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_always_get_pdf_extension() {
        assert_eq!(MediaKind::Document.extension(Some("image/png")), "pdf");
        assert_eq!(MediaKind::Document.extension(None), "pdf");
    }

    #[test]
    fn image_extension_follows_content_type() {
        assert_eq!(MediaKind::Image.extension(Some("image/png")), "png");
        assert_eq!(MediaKind::Image.extension(Some("image/jpeg")), "jpg");
        assert_eq!(MediaKind::Image.extension(None), "bin");
    }

    #[test]
    fn document_content_type_is_forced() {
        assert_eq!(
            MediaKind::Document.effective_content_type(Some("application/octet-stream")),
            "application/pdf"
        );
        assert_eq!(
            MediaKind::Image.effective_content_type(Some("image/webp")),
            "image/webp"
        );
    }
}
