use crate::token::TokenClaims;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A user authenticated via OAuth2, independent of the issuing provider
/// (Auth0, Supabase, Cognito, Firebase, ...).
///
/// Constructed fresh per authenticated request; there is no session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    /// Provider name, e.g. "auth0" or the configured fallback
    pub provider: String,
    /// The raw token subject, as known to the provider
    pub provider_user_id: String,
    #[serde(default)]
    pub roles: HashSet<String>,
    #[serde(default)]
    pub permissions: HashSet<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// True when the user holds at least one of the given roles.
    pub fn has_any_role<I, S>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles.into_iter().any(|role| self.has_role(role.as_ref()))
    }

    /// True when the user holds every one of the given roles.
    pub fn has_all_roles<I, S>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        roles.into_iter().all(|role| self.has_role(role.as_ref()))
    }

    /// True when the user holds every one of the given permissions.
    pub fn has_all_permissions<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        permissions
            .into_iter()
            .all(|permission| self.has_permission(permission.as_ref()))
    }
}

/// Derive the stable user id for a token subject.
///
/// Well-formed UUID subjects are used as-is; anything else maps to the v5
/// namespace UUID of the subject string, so one subject always yields the
/// same id.
pub fn user_id_for_subject(subject: &str) -> Uuid {
    Uuid::parse_str(subject)
        .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_DNS, subject.as_bytes()))
}

/// Build an `AuthenticatedUser` from verified claims.
///
/// Pure and total: no I/O, cannot fail. The token's own `provider` claim
/// wins over `provider_name` when present.
pub fn to_user(claims: &TokenClaims, provider_name: &str) -> AuthenticatedUser {
    let now = Utc::now();
    AuthenticatedUser {
        user_id: user_id_for_subject(&claims.subject),
        email: claims.email.clone().unwrap_or_default(),
        email_verified: claims.email_verified,
        name: claims.name.clone(),
        provider: claims
            .provider
            .clone()
            .unwrap_or_else(|| provider_name.to_string()),
        provider_user_id: claims.subject.clone(),
        roles: claims.roles.iter().cloned().collect(),
        permissions: claims.permissions.iter().cloned().collect(),
        metadata: HashMap::new(),
        created_at: now,
        last_login: now,
    }
}
