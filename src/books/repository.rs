/// Book repository implementation using runtime queries
use crate::{
    db::models::Book,
    error::{AppError, AppResult},
    media::StoredMedia,
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields of a book to be created. Both media objects must already be
/// stored; their URLs and keys are persisted together with the record.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub content: String,
    pub cover: StoredMedia,
    pub pdf: StoredMedia,
    pub available: bool,
}

/// Book repository service
pub struct BookRepository {
    db: SqlitePool,
}

impl BookRepository {
    /// Create a new book repository
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist a new book
    pub async fn create(&self, new: NewBook) -> AppResult<Book> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO books (id, title, author, description, content,
                                cover_url, cover_key, pdf_url, pdf_key,
                                available, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.description)
        .bind(&new.content)
        .bind(&new.cover.url)
        .bind(&new.cover.key)
        .bind(&new.pdf.url)
        .bind(&new.pdf.key)
        .bind(new.available)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        tracing::info!(book = %id, title = %new.title, "book created");

        Ok(Book {
            id,
            title: new.title,
            author: new.author,
            description: new.description,
            content: new.content,
            cover_url: new.cover.url,
            cover_key: Some(new.cover.key),
            pdf_url: new.pdf.url,
            pdf_key: Some(new.pdf.key),
            available: new.available,
            created_at: now,
            updated_at: now,
        })
    }

    /// All books in insertion order
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY rowid")
            .fetch_all(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(books)
    }

    /// Fetch a book by id
    pub async fn get(&self, id: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(book)
    }

    /// Fetch a book by id, failing with NotFound
    pub async fn get_required(&self, id: &str) -> AppResult<Book> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Remove a book record and return it.
    ///
    /// Membership sets and the comment-reference list cascade with the row;
    /// comment entities are intentionally left in place. Media cleanup is
    /// the caller's (best-effort) concern, which is why the deleted record
    /// is handed back with its storage keys.
    pub async fn delete(&self, id: &str) -> AppResult<Book> {
        let book = self.get_required(id).await?;

        sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(AppError::Database)?;

        tracing::info!(book = %id, "book deleted");

        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            description: "Description".to_string(),
            content: "Content".to_string(),
            cover: StoredMedia {
                url: "http://localhost:8700/media/books/covers/c.png".to_string(),
                key: "books/covers/c.png".to_string(),
            },
            pdf: StoredMedia {
                url: "http://localhost:8700/media/books/pdfs/d.pdf".to_string(),
                key: "books/pdfs/d.pdf".to_string(),
            },
            available: true,
        }
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (pool, _dir) = test_pool().await;
        let repo = BookRepository::new(pool);

        let created = repo.create(new_book("A")).await.unwrap();
        let fetched = repo.get_required(&created.id).await.unwrap();

        assert_eq!(fetched.title, "A");
        assert!(fetched.available);
        assert_eq!(fetched.cover_key.as_deref(), Some("books/covers/c.png"));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (pool, _dir) = test_pool().await;
        let repo = BookRepository::new(pool);

        repo.create(new_book("first")).await.unwrap();
        repo.create(new_book("second")).await.unwrap();
        repo.create(new_book("third")).await.unwrap();

        let titles: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn get_required_missing_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let repo = BookRepository::new(pool);

        let result = repo.get_required("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_returns_record_and_removes_row() {
        let (pool, _dir) = test_pool().await;
        let repo = BookRepository::new(pool);

        let created = repo.create(new_book("doomed")).await.unwrap();
        let deleted = repo.delete(&created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);

        assert!(repo.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (pool, _dir) = test_pool().await;
        let repo = BookRepository::new(pool);

        let result = repo.delete("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
