/// Identity resolution
///
/// Maps opaque external-provider identities to local user records, creating
/// them lazily on first sight, and attaches the caller's role.

pub mod resolver;

pub use resolver::{Identity, IdentityResolver, ProfileHints};

use serde::{Deserialize, Serialize};

/// Role attached to a resolved identity.
///
/// Computed once by the resolver from configuration; call sites check the
/// attribute instead of comparing emails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}
