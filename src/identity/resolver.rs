/// Identity resolver implementation using runtime queries
use crate::{
    db::models::User,
    error::{AppError, AppResult},
    identity::Role,
};
use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Profile attributes forwarded by the identity provider for the
/// current request. All hints are optional except the email, which backs
/// the unique email column.
#[derive(Debug, Clone, Default)]
pub struct ProfileHints {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// A resolved identity: the local user record plus the caller's role.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub role: Role,
}

/// Identity resolver service
pub struct IdentityResolver {
    db: SqlitePool,
    admin_email: String,
}

impl IdentityResolver {
    /// Create a new identity resolver
    pub fn new(db: SqlitePool, admin_email: String) -> Self {
        Self { db, admin_email }
    }

    /// Resolve an external identity to a local user, creating the record
    /// lazily on first sight.
    pub async fn resolve(&self, subject: &str, hints: &ProfileHints) -> AppResult<Identity> {
        if let Some(user) = self.get_by_subject(subject).await? {
            let role = self.role_for(&user.email);
            return Ok(Identity { user, role });
        }

        let user = self.create_user(subject, hints).await?;
        let role = self.role_for(&user.email);

        tracing::info!(subject = %subject, username = %user.username, "created user on first sight");

        Ok(Identity { user, role })
    }

    /// Look up a user by external-identity key
    pub async fn get_by_subject(&self, subject: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE subject = ?1")
            .bind(subject)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(user)
    }

    /// Role attribute for a resolved identity
    fn role_for(&self, email: &str) -> Role {
        if email.eq_ignore_ascii_case(&self.admin_email) {
            Role::Admin
        } else {
            Role::Member
        }
    }

    async fn create_user(&self, subject: &str, hints: &ProfileHints) -> AppResult<User> {
        let email = hints
            .email
            .clone()
            .ok_or_else(|| {
                AppError::Unauthenticated("Identity provider supplied no email".to_string())
            })?;

        if self.email_exists(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let username = hints
            .username
            .clone()
            .unwrap_or_else(|| fallback_username(hints.first_name.as_deref()));
        let avatar_url = hints.avatar_url.clone().unwrap_or_default();

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, subject, username, email, avatar_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(subject)
        .bind(&username)
        .bind(&email)
        .bind(&avatar_url)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(User {
            id,
            subject: subject.to_string(),
            username,
            email,
            avatar_url,
            created_at: now,
            updated_at: now,
        })
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::Database)?;

        Ok(row.is_some())
    }
}

/// Fallback display name when the provider has no explicit username:
/// `user_<firstname-lowercased><random 0-999>`
fn fallback_username(first_name: Option<&str>) -> String {
    let first = first_name.unwrap_or_default().to_lowercase();
    let suffix = rand::thread_rng().gen_range(0..1000);
    format!("user_{}{}", first, suffix)
}
