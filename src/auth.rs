/// Authentication extractors
///
/// The external identity provider authenticates callers upstream and
/// forwards the verified identity as request headers. These extractors
/// resolve that identity to a local user (creating it lazily) and attach
/// the caller's role.
use crate::{
    context::AppContext,
    db::models::User,
    error::AppError,
    identity::{ProfileHints, Role},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

/// Header carrying the opaque identity key issued by the provider
pub const SUBJECT_HEADER: &str = "x-identity-subject";
/// Profile hint headers forwarded alongside the subject
pub const NAME_HEADER: &str = "x-identity-name";
pub const FIRST_NAME_HEADER: &str = "x-identity-first-name";
pub const EMAIL_HEADER: &str = "x-identity-email";
pub const AVATAR_HEADER: &str = "x-identity-avatar";

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Identity forwarded with the current request, if any
pub fn forwarded_identity(headers: &HeaderMap) -> Option<(String, ProfileHints)> {
    let subject = header_value(headers, SUBJECT_HEADER)?;
    let hints = ProfileHints {
        username: header_value(headers, NAME_HEADER),
        first_name: header_value(headers, FIRST_NAME_HEADER),
        email: header_value(headers, EMAIL_HEADER),
        avatar_url: header_value(headers, AVATAR_HEADER),
    };
    Some((subject, hints))
}

/// Authenticated context - resolves the forwarded identity or rejects with 401
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let (subject, hints) = forwarded_identity(&parts.headers).ok_or_else(|| {
            AppError::Unauthenticated("User not authenticated".to_string())
        })?;

        let identity = state.identity.resolve(&subject, &hints).await?;

        Ok(AuthContext {
            user: identity.user,
            role: identity.role,
        })
    }
}

/// Optional authenticated context - does not fail if no identity is forwarded
#[derive(Debug, Clone)]
pub struct OptionalAuthContext {
    pub auth: Option<AuthContext>,
}

#[async_trait]
impl FromRequestParts<AppContext> for OptionalAuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let auth = match forwarded_identity(&parts.headers) {
            Some((subject, hints)) => match state.identity.resolve(&subject, &hints).await {
                Ok(identity) => Some(AuthContext {
                    user: identity.user,
                    role: identity.role,
                }),
                // Unresolvable identity - treat the caller as anonymous
                Err(_) => None,
            },
            None => None,
        };

        Ok(OptionalAuthContext { auth })
    }
}

/// Administrative context - requires the admin role
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;

        if !auth.role.is_admin() {
            tracing::warn!(
                user = %auth.user.id,
                role = auth.role.as_str(),
                "non-admin attempted admin action"
            );
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        Ok(AdminContext { user: auth.user })
    }
}
