use crate::authz::AuthzError;
use crate::jwks::KeyError;
use crate::verifier::VerifyError;
use thiserror::Error;

/// Top-level failure returned by the authentication service.
///
/// Every variant stays typed all the way up so a boundary layer can map
/// each kind to a distinct response, while `public_message` keeps the
/// user-facing text generic.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    Authz(#[from] AuthzError),
    /// The active provider does not support this operation (e.g. token
    /// refresh requires a provider's token-endpoint API)
    #[error("operation '{operation}' is not implemented by provider '{provider}'")]
    NotImplementedByProvider {
        provider: String,
        operation: &'static str,
    },
}

/// Coarse classification a boundary layer maps to response codes:
/// expired/invalid tokens are unauthenticated, failed requirement checks are
/// forbidden, key-set outages are retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Unauthenticated,
    Forbidden,
    Unavailable,
    Internal,
}

impl AuthError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Verify(VerifyError::KeyUnavailable(KeyError::Fetch { .. })) => {
                ErrorClass::Unavailable
            }
            Self::Verify(_) => ErrorClass::Unauthenticated,
            Self::Authz(_) => ErrorClass::Forbidden,
            Self::NotImplementedByProvider { .. } => ErrorClass::Internal,
        }
    }

    /// Whether retrying the same request later can succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Unavailable
    }

    /// Generic user-facing text. Never reveals why verification failed;
    /// logs retain the specific kind for diagnostics.
    pub fn public_message(&self) -> &'static str {
        match self.class() {
            ErrorClass::Unauthenticated => "Authentication failed",
            ErrorClass::Forbidden => "Insufficient privileges",
            ErrorClass::Unavailable => "Authentication service temporarily unavailable",
            ErrorClass::Internal => "Internal authentication error",
        }
    }
}
