/// Comment service
///
/// Creates comment entities tied to a user and a book, maintains the book's
/// comment-reference list, and loads populated comment views for display.

pub mod manager;

pub use manager::{CommentManager, CommentView, CommenterProfile};
