use super::TokenProvider;
use crate::authz::{PermissionRequirement, RoleRequirement};
use crate::config::AuthConfig;
use crate::errors::AuthError;
use crate::identity::{self, AuthenticatedUser};
use crate::jwks::JwksCache;
use crate::token::{OAuth2Token, TokenClaims};
use crate::verifier::TokenVerifier;
use log::warn;

/// Generic JWT provider: works with any OAuth2 provider that signs JWTs and
/// publishes a JWKS endpoint.
///
/// `refresh_token` and `revoke_token` signal a capability gap rather than
/// implementing anything: both require the provider's own token-endpoint
/// API, which sits outside this core. Provider-specific integrations
/// implement them on their own [`TokenProvider`] variants.
#[derive(Clone)]
pub struct GenericJwtProvider {
    name: String,
    verifier: TokenVerifier,
}

impl GenericJwtProvider {
    pub fn new(config: &AuthConfig, keys: JwksCache) -> Result<Self, String> {
        Ok(Self {
            name: config.provider.name.clone(),
            verifier: TokenVerifier::new(config, keys)?,
        })
    }

    /// Build the provider along with its own key cache.
    pub fn from_config(config: &AuthConfig) -> Result<Self, String> {
        let keys = JwksCache::new(config)?;
        Self::new(config, keys)
    }
}

#[async_trait::async_trait]
impl TokenProvider for GenericJwtProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        Ok(self.verifier.verify(token).await?)
    }

    fn user_from_claims(&self, claims: &TokenClaims) -> AuthenticatedUser {
        identity::to_user(claims, &self.name)
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<OAuth2Token, AuthError> {
        warn!("token refresh requested on provider '{}', which has no token endpoint", self.name);
        Err(AuthError::NotImplementedByProvider {
            provider: self.name.clone(),
            operation: "refresh",
        })
    }

    async fn revoke_token(&self, _token: &str) -> Result<(), AuthError> {
        warn!("token revocation requested on provider '{}', which has no token endpoint", self.name);
        Err(AuthError::NotImplementedByProvider {
            provider: self.name.clone(),
            operation: "revoke",
        })
    }

    fn validate_permissions(
        &self,
        user: &AuthenticatedUser,
        required: &PermissionRequirement,
    ) -> bool {
        required.is_satisfied_by(user)
    }

    fn validate_roles(&self, user: &AuthenticatedUser, required: &RoleRequirement) -> bool {
        required.is_satisfied_by(user)
    }
}
