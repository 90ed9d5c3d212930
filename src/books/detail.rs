/// Book detail read model
use crate::{
    books::{BookRepository, BookView},
    circulation::CirculationManager,
    comments::{CommentManager, CommentView},
    db::models::User,
    error::AppResult,
};

/// Assembled detail view: the book with populated comments plus the
/// requesting user's borrow/like status.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: BookView,
    pub comments: Vec<CommentView>,
    pub is_borrowed: bool,
    pub is_liked: bool,
}

impl BookDetail {
    /// Assemble the detail view for one book.
    ///
    /// Anonymous viewers get both status flags defaulted false.
    pub async fn load(
        books: &BookRepository,
        comments: &CommentManager,
        circulation: &CirculationManager,
        book_id: &str,
        viewer: Option<&User>,
    ) -> AppResult<Self> {
        let book = books.get_required(book_id).await?;
        let populated = comments.for_book(book_id).await?;

        let (is_borrowed, is_liked) = match viewer {
            Some(user) => circulation.status(&user.id, book_id).await?,
            None => (false, false),
        };

        Ok(Self {
            book: BookView {
                book,
                comments: populated.clone(),
            },
            comments: populated,
            is_borrowed,
            is_liked,
        })
    }
}
