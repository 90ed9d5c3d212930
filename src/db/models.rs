/// Row models for the library database
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record in the database
///
/// `subject` is the opaque key issued by the external identity provider;
/// a row is created lazily the first time a subject is seen.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub subject: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub content: String,
    #[serde(rename = "coverImage")]
    pub cover_url: String,
    #[serde(skip_serializing)]
    pub cover_key: Option<String>,
    pub pdf_url: String,
    #[serde(skip_serializing)]
    pub pdf_key: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment entity. Listing is driven by the book's reference list
/// (`book_comments`), not by this table alone.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Borrow-history ledger row. Opened when a borrow toggle adds membership,
/// closed when the same user toggles the book back.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}
