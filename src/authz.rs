use crate::identity::AuthenticatedUser;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when a user fails to satisfy a requirement
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The user lacks one or more required permissions; `missing` lists them
    #[error("insufficient permissions, required: {}", .required.join(", "))]
    InsufficientPermissions {
        required: Vec<String>,
        missing: Vec<String>,
    },
    /// The user holds none of the accepted roles
    #[error("insufficient roles, required one of: {}", .required.join(", "))]
    InsufficientRoles { required: Vec<String> },
}

/// Permissions a protected operation demands. Every entry must be held;
/// an empty requirement always passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionRequirement {
    pub required: HashSet<String>,
}

impl PermissionRequirement {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_satisfied_by(&self, user: &AuthenticatedUser) -> bool {
        self.required
            .iter()
            .all(|permission| user.permissions.contains(permission))
    }

    /// Enforce the requirement, failing with the required and missing sets.
    pub fn check(&self, user: &AuthenticatedUser) -> Result<(), AuthzError> {
        if self.is_satisfied_by(user) {
            debug!("permission check passed for user {}", user.user_id);
            return Ok(());
        }

        let required = sorted(&self.required);
        let missing: Vec<String> = required
            .iter()
            .filter(|permission| !user.permissions.contains(*permission))
            .cloned()
            .collect();
        warn!(
            "user {} lacks required permissions, missing: {}",
            user.user_id,
            missing.join(", ")
        );
        Err(AuthzError::InsufficientPermissions { required, missing })
    }
}

/// Roles a protected operation accepts. Holding any one suffices; an empty
/// requirement places no restriction, consistent with permissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub required: HashSet<String>,
}

impl RoleRequirement {
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_satisfied_by(&self, user: &AuthenticatedUser) -> bool {
        self.required.is_empty() || self.required.iter().any(|role| user.roles.contains(role))
    }

    /// Enforce the requirement, failing with the accepted role set.
    pub fn check(&self, user: &AuthenticatedUser) -> Result<(), AuthzError> {
        if self.is_satisfied_by(user) {
            debug!("role check passed for user {}", user.user_id);
            return Ok(());
        }

        let required = sorted(&self.required);
        warn!(
            "user {} holds none of the required roles: {}",
            user.user_id,
            required.join(", ")
        );
        Err(AuthzError::InsufficientRoles { required })
    }
}

fn sorted(values: &HashSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.iter().cloned().collect();
    values.sort();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::to_user;
    use crate::token::TokenClaims;
    use serde_json::json;

    fn user_with(permissions: &[&str], roles: &[&str]) -> AuthenticatedUser {
        let claims: TokenClaims = serde_json::from_value(json!({
            "sub": "user-1",
            "exp": 1_700_003_600,
            "roles": roles,
            "permissions": permissions,
        }))
        .unwrap();
        to_user(&claims, "jwt")
    }

    #[test]
    fn test_empty_permission_requirement_always_passes() {
        let user = user_with(&[], &[]);
        let requirement = PermissionRequirement::default();
        assert!(requirement.is_satisfied_by(&user));
        assert!(requirement.check(&user).is_ok());
    }

    #[test]
    fn test_permission_subset_passes() {
        let user = user_with(&["read:data", "write:data", "admin:write"], &[]);
        let requirement = PermissionRequirement::new(["read:data", "admin:write"]);
        assert!(requirement.check(&user).is_ok());
    }

    #[test]
    fn test_missing_permissions_reported() {
        let user = user_with(&["read:data"], &[]);
        let requirement = PermissionRequirement::new(["read:data", "write:data", "admin:write"]);

        let err = requirement.check(&user).unwrap_err();
        match err {
            AuthzError::InsufficientPermissions { required, missing } => {
                assert_eq!(required, vec!["admin:write", "read:data", "write:data"]);
                assert_eq!(missing, vec!["admin:write", "write:data"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_role_requirement_always_passes() {
        let user = user_with(&[], &[]);
        let requirement = RoleRequirement::default();
        assert!(requirement.is_satisfied_by(&user));
        assert!(requirement.check(&user).is_ok());
    }

    #[test]
    fn test_any_matching_role_passes() {
        let user = user_with(&[], &["user"]);
        let requirement = RoleRequirement::new(["admin", "user"]);
        assert!(requirement.check(&user).is_ok());
    }

    #[test]
    fn test_no_matching_role_fails_with_required_set() {
        let user = user_with(&[], &["guest"]);
        let requirement = RoleRequirement::new(["admin", "moderator"]);

        let err = requirement.check(&user).unwrap_err();
        match err {
            AuthzError::InsufficientRoles { required } => {
                assert_eq!(required, vec!["admin", "moderator"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_message_lists_requirements() {
        let user = user_with(&[], &[]);
        let err = PermissionRequirement::new(["b:perm", "a:perm"])
            .check(&user)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "insufficient permissions, required: a:perm, b:perm"
        );
    }
}
