/// Circulation manager implementation using runtime queries
use crate::{
    db::models::{Book, Loan},
    error::{AppError, AppResult},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Result of a borrow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowOutcome {
    pub borrowed: bool,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    pub liked: bool,
}

/// Circulation manager service
pub struct CirculationManager {
    db: SqlitePool,
}

impl CirculationManager {
    /// Create a new circulation manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Toggle a book in the user's borrowed set.
    ///
    /// Absent: adds membership, marks the book unavailable, opens a loan.
    /// Present: removes membership, marks the book available, closes the
    /// open loan. All writes commit in one transaction. The availability
    /// flag is shared and non-counted: a second user toggling the same
    /// book flips it independently.
    pub async fn toggle_borrow(&self, user_id: &str, book_id: &str) -> AppResult<BorrowOutcome> {
        let mut tx = self.db.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        let present = sqlx::query(
            "SELECT 1 FROM borrowed_books WHERE user_id = ?1 AND book_id = ?2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .is_some();

        if !present {
            sqlx::query(
                "INSERT INTO borrowed_books (user_id, book_id, created_at) VALUES (?1, ?2, ?3)",
            )
            .bind(user_id)
            .bind(book_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            sqlx::query("UPDATE books SET available = 0, updated_at = ?1 WHERE id = ?2")
                .bind(now)
                .bind(book_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            sqlx::query(
                "INSERT INTO loans (id, user_id, book_id, borrowed_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(book_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        } else {
            sqlx::query("DELETE FROM borrowed_books WHERE user_id = ?1 AND book_id = ?2")
                .bind(user_id)
                .bind(book_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            sqlx::query("UPDATE books SET available = 1, updated_at = ?1 WHERE id = ?2")
                .bind(now)
                .bind(book_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            sqlx::query(
                "UPDATE loans SET returned_at = ?1
                 WHERE user_id = ?2 AND book_id = ?3 AND returned_at IS NULL",
            )
            .bind(now)
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(BorrowOutcome { borrowed: !present })
    }

    /// Toggle a book in the user's wishlist. Never touches availability.
    pub async fn toggle_like(&self, user_id: &str, book_id: &str) -> AppResult<LikeOutcome> {
        let mut tx = self.db.begin().await.map_err(AppError::Database)?;

        let present = sqlx::query("SELECT 1 FROM wishlist WHERE user_id = ?1 AND book_id = ?2")
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .is_some();

        if !present {
            sqlx::query("INSERT INTO wishlist (user_id, book_id, created_at) VALUES (?1, ?2, ?3)")
                .bind(user_id)
                .bind(book_id)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        } else {
            sqlx::query("DELETE FROM wishlist WHERE user_id = ?1 AND book_id = ?2")
                .bind(user_id)
                .bind(book_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(LikeOutcome { liked: !present })
    }

    /// Borrow/like status of one book for one user
    pub async fn status(&self, user_id: &str, book_id: &str) -> AppResult<(bool, bool)> {
        let is_borrowed = sqlx::query(
            "SELECT 1 FROM borrowed_books WHERE user_id = ?1 AND book_id = ?2",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::Database)?
        .is_some();

        let is_liked = sqlx::query("SELECT 1 FROM wishlist WHERE user_id = ?1 AND book_id = ?2")
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)?
            .is_some();

        Ok((is_borrowed, is_liked))
    }

    /// Books currently borrowed by a user, in borrow order
    pub async fn borrowed_books(&self, user_id: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.* FROM borrowed_books m
             JOIN books b ON b.id = m.book_id
             WHERE m.user_id = ?1
             ORDER BY m.rowid",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(books)
    }

    /// A user's borrow history, oldest first. Rows survive book deletion.
    pub async fn loan_history(&self, user_id: &str) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE user_id = ?1 ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(loans)
    }

    /// Books on a user's wishlist, in like order
    pub async fn wishlist(&self, user_id: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT b.* FROM wishlist m
             JOIN books b ON b.id = m.book_id
             WHERE m.user_id = ?1
             ORDER BY m.rowid",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::test_pool;

    async fn seed_user(pool: &SqlitePool, id: &str) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO users (id, subject, username, email, avatar_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, '', ?5, ?6)",
        )
        .bind(id)
        .bind(format!("ext-{}", id))
        .bind(format!("user-{}", id))
        .bind(format!("{}@example.com", id))
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_book(pool: &SqlitePool, id: &str) {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO books (id, title, author, description, content, cover_url, pdf_url, available, created_at, updated_at)
             VALUES (?1, 'T', 'A', 'D', 'C', 'http://x/c.png', 'http://x/d.pdf', 1, ?2, ?3)",
        )
        .bind(id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn available(pool: &SqlitePool, book_id: &str) -> bool {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?1")
            .bind(book_id)
            .fetch_one(pool)
            .await
            .unwrap()
            .available
    }

    #[tokio::test]
    async fn borrow_toggle_round_trip_restores_initial_state() {
        let (pool, _dir) = test_pool().await;
        let manager = CirculationManager::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_book(&pool, "b1").await;

        let first = manager.toggle_borrow("u1", "b1").await.unwrap();
        assert!(first.borrowed);
        assert!(!available(&pool, "b1").await);
        assert_eq!(manager.status("u1", "b1").await.unwrap(), (true, false));

        let second = manager.toggle_borrow("u1", "b1").await.unwrap();
        assert!(!second.borrowed);
        assert!(available(&pool, "b1").await);
        assert_eq!(manager.status("u1", "b1").await.unwrap(), (false, false));
    }

    #[tokio::test]
    async fn like_toggle_never_touches_availability() {
        let (pool, _dir) = test_pool().await;
        let manager = CirculationManager::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_book(&pool, "b1").await;

        let first = manager.toggle_like("u1", "b1").await.unwrap();
        assert!(first.liked);
        assert!(available(&pool, "b1").await);
        assert_eq!(manager.status("u1", "b1").await.unwrap(), (false, true));

        let second = manager.toggle_like("u1", "b1").await.unwrap();
        assert!(!second.liked);
        assert!(available(&pool, "b1").await);
    }

    #[tokio::test]
    async fn borrow_opens_and_closes_loans() {
        let (pool, _dir) = test_pool().await;
        let manager = CirculationManager::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_book(&pool, "b1").await;

        manager.toggle_borrow("u1", "b1").await.unwrap();
        let open: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM loans WHERE user_id = 'u1' AND book_id = 'b1' AND returned_at IS NULL",
        )
        .fetch_optional(&pool)
        .await
        .unwrap();
        assert!(open.is_some());

        manager.toggle_borrow("u1", "b1").await.unwrap();
        let still_open: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM loans WHERE user_id = 'u1' AND book_id = 'b1' AND returned_at IS NULL",
        )
        .fetch_optional(&pool)
        .await
        .unwrap();
        assert!(still_open.is_none());
    }

    #[tokio::test]
    async fn two_borrowers_share_the_availability_flag() {
        let (pool, _dir) = test_pool().await;
        let manager = CirculationManager::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_user(&pool, "u2").await;
        seed_book(&pool, "b1").await;

        manager.toggle_borrow("u1", "b1").await.unwrap();
        manager.toggle_borrow("u2", "b1").await.unwrap();
        assert!(!available(&pool, "b1").await);

        // The second user returning flips the shared flag back even though
        // the first user still holds the book.
        manager.toggle_borrow("u2", "b1").await.unwrap();
        assert!(available(&pool, "b1").await);
        assert_eq!(manager.status("u1", "b1").await.unwrap(), (true, false));
    }

    #[tokio::test]
    async fn membership_lists_are_populated_books() {
        let (pool, _dir) = test_pool().await;
        let manager = CirculationManager::new(pool.clone());
        seed_user(&pool, "u1").await;
        seed_book(&pool, "b1").await;
        seed_book(&pool, "b2").await;

        manager.toggle_borrow("u1", "b1").await.unwrap();
        manager.toggle_like("u1", "b2").await.unwrap();

        let borrowed = manager.borrowed_books("u1").await.unwrap();
        assert_eq!(borrowed.len(), 1);
        assert_eq!(borrowed[0].id, "b1");

        let liked = manager.wishlist("u1").await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, "b2");
    }
}
