/// Book catalog
///
/// CRUD over book records plus the read-model assembly for detail views.

pub mod detail;
pub mod repository;

pub use detail::BookDetail;
pub use repository::{BookRepository, NewBook};

use crate::{comments::CommentView, db::models::Book};
use serde::Serialize;

/// A book with its populated comment list, as served to clients
#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    pub comments: Vec<CommentView>,
}
