use crate::authz::{PermissionRequirement, RoleRequirement};
use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::identity::AuthenticatedUser;
use crate::provider::{GenericJwtProvider, Provider, TokenProvider};
use crate::token::OAuth2Token;
use log::{info, warn};

/// Orchestrates token verification, identity mapping, and authorization
/// behind a provider-agnostic interface.
///
/// Each call is stateless and independently schedulable; the only shared
/// state is the provider's key cache.
#[derive(Clone)]
pub struct AuthenticationService {
    provider: Provider,
}

impl AuthenticationService {
    pub fn new(provider: Provider) -> Self {
        Self { provider }
    }

    /// Build the service with the generic JWT provider from configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, String> {
        Ok(Self::new(Provider::Jwt(GenericJwtProvider::from_config(
            config,
        )?)))
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// Authenticate a bearer token: verify it, then resolve the user.
    ///
    /// Verification failures propagate unchanged; nothing is downgraded to
    /// a generic error on this path.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = match self.provider.verify_token(access_token).await {
            Ok(claims) => claims,
            Err(e) => {
                warn!("token verification failed: {e}");
                return Err(e);
            }
        };

        let user = self.provider.user_from_claims(&claims);
        info!(
            "user authenticated: user_id={} provider={}",
            user.user_id, user.provider
        );
        Ok(user)
    }

    /// Refresh authentication using a refresh token, when the provider
    /// supports it.
    pub async fn refresh(&self, refresh_token: &str) -> Result<OAuth2Token, AuthError> {
        match self.provider.refresh_token(refresh_token).await {
            Ok(token) => {
                info!("token refreshed");
                Ok(token)
            }
            Err(e) => {
                warn!("token refresh failed: {e}");
                Err(e)
            }
        }
    }

    /// Revoke an access token at the provider (logout), when supported.
    pub async fn revoke(&self, access_token: &str) -> Result<(), AuthError> {
        match self.provider.revoke_token(access_token).await {
            Ok(()) => {
                info!("token revoked");
                Ok(())
            }
            Err(e) => {
                warn!("token revocation failed: {e}");
                Err(e)
            }
        }
    }

    /// True when the user holds every required permission.
    pub fn has_permissions(
        &self,
        user: &AuthenticatedUser,
        required: &PermissionRequirement,
    ) -> bool {
        self.provider.validate_permissions(user, required)
    }

    /// True when the user holds at least one accepted role.
    pub fn has_roles(&self, user: &AuthenticatedUser, required: &RoleRequirement) -> bool {
        self.provider.validate_roles(user, required)
    }

    /// Enforce a permission requirement, failing with the missing set.
    pub fn check_permissions(
        &self,
        user: &AuthenticatedUser,
        required: &PermissionRequirement,
    ) -> Result<(), AuthError> {
        Ok(required.check(user)?)
    }

    /// Enforce a role requirement, failing with the accepted set.
    pub fn check_roles(
        &self,
        user: &AuthenticatedUser,
        required: &RoleRequirement,
    ) -> Result<(), AuthError> {
        Ok(required.check(user)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorClass;
    use crate::test_utils::{claims, TestFixture, TEST_KID};
    use crate::verifier::VerifyError;
    use serde_json::json;

    #[tokio::test]
    async fn test_authenticate_then_check_permissions() {
        let fixture = TestFixture::new().await;

        let mut payload = claims("auth0|abc123");
        payload["permissions"] = json!(["admin:write"]);
        let token = fixture.key.sign(TEST_KID, &payload);

        let user = fixture.service.authenticate(&token).await.unwrap();
        assert!(fixture
            .service
            .check_permissions(&user, &PermissionRequirement::new(["admin:write"]))
            .is_ok());

        let err = fixture
            .service
            .check_permissions(
                &user,
                &PermissionRequirement::new(["admin:write", "other:perm"]),
            )
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Forbidden);
    }

    #[tokio::test]
    async fn test_authenticate_is_idempotent_on_user_id() {
        let fixture = TestFixture::new().await;
        let token = fixture.token_for("auth0|abc123");

        let first = fixture.service.authenticate(&token).await.unwrap();
        let second = fixture.service.authenticate(&token).await.unwrap();
        assert_eq!(first.user_id, second.user_id);
    }

    #[tokio::test]
    async fn test_expired_token_denied_with_originating_error() {
        let fixture = TestFixture::new().await;

        let mut payload = claims("user-1");
        payload["exp"] = json!(chrono::Utc::now().timestamp() - 3600);
        let token = fixture.key.sign(TEST_KID, &payload);

        let err = fixture.service.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Verify(VerifyError::Expired)));
        assert_eq!(err.class(), ErrorClass::Unauthenticated);
    }

    #[tokio::test]
    async fn test_has_permissions_and_roles_bool_forms() {
        let fixture = TestFixture::new().await;

        let mut payload = claims("user-1");
        payload["roles"] = json!(["admin"]);
        payload["permissions"] = json!(["read:data", "write:data"]);
        let token = fixture.key.sign(TEST_KID, &payload);
        let user = fixture.service.authenticate(&token).await.unwrap();

        assert!(fixture
            .service
            .has_permissions(&user, &PermissionRequirement::new(["read:data"])));
        assert!(!fixture
            .service
            .has_permissions(&user, &PermissionRequirement::new(["admin:write"])));
        assert!(fixture
            .service
            .has_roles(&user, &RoleRequirement::new(["admin", "moderator"])));
        assert!(!fixture
            .service
            .has_roles(&user, &RoleRequirement::new(["moderator"])));
        // Empty requirements place no restriction.
        assert!(fixture
            .service
            .has_permissions(&user, &PermissionRequirement::default()));
        assert!(fixture
            .service
            .has_roles(&user, &RoleRequirement::default()));
    }

    #[tokio::test]
    async fn test_refresh_and_revoke_surface_capability_gap() {
        let fixture = TestFixture::new().await;

        let err = fixture.service.refresh("refresh-token").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::NotImplementedByProvider { operation: "refresh", .. }
        ));

        let err = fixture.service.revoke("access-token").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::NotImplementedByProvider { operation: "revoke", .. }
        ));
    }
}
