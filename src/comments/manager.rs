/// Comment manager implementation using runtime queries
use crate::{
    db::models::User,
    error::{AppError, AppResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Maximum comment body length, in characters, after trimming
pub const MAX_COMMENT_CHARS: usize = 500;

/// Public profile fields of a commenter, expanded onto the comment for
/// immediate client display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommenterProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: String,
}

/// A comment with its commenter expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user: CommenterProfile,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Flat row produced by the populated-comment join
#[derive(Debug, FromRow)]
struct CommentRecord {
    id: String,
    body: String,
    created_at: DateTime<Utc>,
    link_book_id: String,
    user_id: String,
    username: String,
    email: String,
    avatar_url: String,
}

impl CommentRecord {
    fn into_view(self) -> CommentView {
        CommentView {
            id: self.id,
            user: CommenterProfile {
                id: self.user_id,
                name: self.username,
                email: self.email,
                profile_image: self.avatar_url,
            },
            text: self.body,
            created_at: self.created_at,
        }
    }
}

/// Comment manager service
pub struct CommentManager {
    db: SqlitePool,
}

impl CommentManager {
    /// Create a new comment manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Add a comment to a book.
    ///
    /// The comment entity is written first, then the reference is appended
    /// to the book's list. A failure between the two leaves an unlinked
    /// comment that listing never serves.
    pub async fn add(&self, user: &User, book_id: &str, text: &str) -> AppResult<CommentView> {
        let body = text.trim();
        if body.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if body.chars().count() > MAX_COMMENT_CHARS {
            return Err(AppError::Validation(format!(
                "Comment exceeds maximum length of {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO comments (id, user_id, book_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&user.id)
        .bind(book_id)
        .bind(body)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        sqlx::query("INSERT INTO book_comments (book_id, comment_id) VALUES (?1, ?2)")
            .bind(book_id)
            .bind(&id)
            .execute(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(CommentView {
            id,
            user: CommenterProfile {
                id: user.id.clone(),
                name: user.username.clone(),
                email: user.email.clone(),
                profile_image: user.avatar_url.clone(),
            },
            text: body.to_string(),
            created_at: now,
        })
    }

    /// Populated comments for one book, in reference-list order
    pub async fn for_book(&self, book_id: &str) -> AppResult<Vec<CommentView>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            "SELECT c.id, c.body, c.created_at, bc.book_id AS link_book_id,
                    u.id AS user_id, u.username, u.email, u.avatar_url
             FROM book_comments bc
             JOIN comments c ON c.id = bc.comment_id
             JOIN users u ON u.id = c.user_id
             WHERE bc.book_id = ?1
             ORDER BY bc.rowid",
        )
        .bind(book_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(records.into_iter().map(CommentRecord::into_view).collect())
    }

    /// Populated comments for a set of books, grouped by book id
    pub async fn for_books(
        &self,
        book_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<CommentView>>> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = (1..=book_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT c.id, c.body, c.created_at, bc.book_id AS link_book_id,
                    u.id AS user_id, u.username, u.email, u.avatar_url
             FROM book_comments bc
             JOIN comments c ON c.id = bc.comment_id
             JOIN users u ON u.id = c.user_id
             WHERE bc.book_id IN ({})
             ORDER BY bc.rowid",
            placeholders
        );

        let mut query = sqlx::query_as::<_, CommentRecord>(&sql);
        for id in book_ids {
            query = query.bind(id);
        }

        let records = query
            .fetch_all(&self.db)
            .await
            .map_err(AppError::Database)?;

        let mut grouped: HashMap<String, Vec<CommentView>> = HashMap::new();
        for record in records {
            let book_id = record.link_book_id.clone();
            grouped.entry(book_id).or_default().push(record.into_view());
        }

        Ok(grouped)
    }
}
