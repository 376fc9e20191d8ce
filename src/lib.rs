//! Provider-agnostic OAuth2/JWT authentication and authorization.
//!
//! The crate verifies bearer tokens issued by any JWKS-publishing OAuth2
//! provider (Auth0, Supabase, Cognito, Firebase, ...) and enforces
//! permission/role requirements on the resulting users:
//!
//! - [`jwks::JwksCache`] fetches and caches the provider's signing keys,
//! - [`verifier::TokenVerifier`] validates signature, issuer, audience, and
//!   expiry,
//! - [`identity`] maps verified claims to an [`AuthenticatedUser`],
//! - [`authz`] evaluates permission and role requirements,
//! - [`service::AuthenticationService`] ties it together behind the
//!   [`TokenProvider`] abstraction.
//!
//! The HTTP layer sits outside this crate: it extracts the raw bearer token
//! from the request, calls [`AuthenticationService::authenticate`], and maps
//! [`AuthError::class`] to a response code.

pub mod authz;
pub mod cache;
pub mod config;
pub mod errors;
pub mod identity;
pub mod jwks;
pub mod provider;
pub mod service;
#[cfg(test)]
mod test_utils;
pub mod token;
pub mod verifier;

pub use crate::authz::{AuthzError, PermissionRequirement, RoleRequirement};
pub use crate::cache::SigningKey;
pub use crate::config::AuthConfig;
pub use crate::errors::{AuthError, ErrorClass};
pub use crate::identity::AuthenticatedUser;
pub use crate::jwks::{JwksCache, KeyError};
pub use crate::provider::{GenericJwtProvider, Provider, TokenProvider};
pub use crate::service::AuthenticationService;
pub use crate::token::{Audience, OAuth2Token, TokenClaims};
pub use crate::verifier::{TokenVerifier, VerifyError};
