use crate::authz::{PermissionRequirement, RoleRequirement};
use crate::errors::AuthError;
use crate::identity::AuthenticatedUser;
use crate::token::{OAuth2Token, TokenClaims};

pub mod jwt;

pub use jwt::GenericJwtProvider;

/// Contract every OAuth2 provider integration fulfills.
///
/// Callers depend on this trait (or the [`Provider`] enum) only, which keeps
/// the core agnostic to whether tokens come from Auth0, Supabase, Cognito,
/// or any other JWT-issuing provider.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Provider name reported on authenticated users.
    fn name(&self) -> &str;

    /// Verify a bearer token and return its decoded claims.
    async fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Map verified claims to an authenticated user. Pure.
    fn user_from_claims(&self, claims: &TokenClaims) -> AuthenticatedUser;

    /// Verify a token and resolve the authenticated user in one step.
    async fn get_user_info(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify_token(token).await?;
        Ok(self.user_from_claims(&claims))
    }

    /// Exchange a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, AuthError>;

    /// Invalidate an access token at the provider.
    async fn revoke_token(&self, token: &str) -> Result<(), AuthError>;

    /// True when the user holds every required permission.
    fn validate_permissions(
        &self,
        user: &AuthenticatedUser,
        required: &PermissionRequirement,
    ) -> bool;

    /// True when the user holds at least one accepted role (an empty
    /// requirement places no restriction).
    fn validate_roles(&self, user: &AuthenticatedUser, required: &RoleRequirement) -> bool;
}

/// Concrete provider dispatch. The same pluggable-backend shape as the
/// signing-key store: one enum, chosen at construction, trait calls
/// delegated to the active variant.
#[derive(Clone)]
pub enum Provider {
    /// Generic JWT/JWKS provider
    Jwt(GenericJwtProvider),
}

#[async_trait::async_trait]
impl TokenProvider for Provider {
    fn name(&self) -> &str {
        match self {
            Self::Jwt(provider) => provider.name(),
        }
    }

    async fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        match self {
            Self::Jwt(provider) => provider.verify_token(token).await,
        }
    }

    fn user_from_claims(&self, claims: &TokenClaims) -> AuthenticatedUser {
        match self {
            Self::Jwt(provider) => provider.user_from_claims(claims),
        }
    }

    async fn get_user_info(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        match self {
            Self::Jwt(provider) => provider.get_user_info(token).await,
        }
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, AuthError> {
        match self {
            Self::Jwt(provider) => provider.refresh_token(refresh_token).await,
        }
    }

    async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        match self {
            Self::Jwt(provider) => provider.revoke_token(token).await,
        }
    }

    fn validate_permissions(
        &self,
        user: &AuthenticatedUser,
        required: &PermissionRequirement,
    ) -> bool {
        match self {
            Self::Jwt(provider) => provider.validate_permissions(user, required),
        }
    }

    fn validate_roles(&self, user: &AuthenticatedUser, required: &RoleRequirement) -> bool {
        match self {
            Self::Jwt(provider) => provider.validate_roles(user, required),
        }
    }
}
