use crate::config::AuthConfig;
use crate::jwks::{JwksCache, KeyError};
use crate::token::TokenClaims;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use log::debug;
use thiserror::Error;

/// Errors that can occur while verifying a bearer token
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token could not be parsed, has no usable header, or failed
    /// validation in a way that does not fit a more specific variant
    #[error("invalid token: {0}")]
    InvalidFormat(String),
    /// The token's `exp` claim lies in the past
    #[error("token has expired")]
    Expired,
    /// The signature does not match the resolved signing key, or the token
    /// uses an algorithm outside the configured allow-list
    #[error("token signature is invalid: {0}")]
    SignatureInvalid(String),
    /// The `iss` claim does not equal the configured issuer
    #[error("token issuer does not match '{expected}'")]
    IssuerMismatch { expected: String },
    /// The `aud` claim does not contain the configured audience
    #[error("token audience does not match '{expected}'")]
    AudienceMismatch { expected: String },
    /// The signing key could not be resolved from the provider's key set
    #[error("signing key unavailable: {0}")]
    KeyUnavailable(#[from] KeyError),
}

/// Validates bearer tokens against the configured issuer, audience, and
/// algorithm allow-list, resolving signing keys through the key cache.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: JwksCache,
    issuer: String,
    audience: Option<String>,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, keys: JwksCache) -> Result<Self, String> {
        Ok(Self {
            keys,
            issuer: config.provider.issuer.clone(),
            audience: config.provider.audience.clone(),
            algorithms: config.provider.algorithms()?,
            leeway: config.provider.leeway,
        })
    }

    /// Verify a token's signature and standard claims, returning the decoded
    /// payload.
    ///
    /// The unverified header supplies the `kid` used to resolve the signing
    /// key; everything else is trusted only after signature validation.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        let header = decode_header(token).map_err(|e| VerifyError::InvalidFormat(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidFormat("token header has no key id".to_string()))?;

        let key = self.keys.get_signing_key(&kid).await?;

        let data = decode::<TokenClaims>(token, key.decoding_key(), &self.validation())
            .map_err(|e| self.classify(e))?;

        debug!("token verified for subject '{}'", data.claims.subject);
        Ok(data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithms[0]);
        validation.algorithms = self.algorithms.clone();
        // jsonwebtoken defaults to 60s of leeway; expiry is exact here
        // unless leeway is configured explicitly.
        validation.leeway = self.leeway;
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    fn classify(&self, err: jsonwebtoken::errors::Error) -> VerifyError {
        match err.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::InvalidIssuer => VerifyError::IssuerMismatch {
                expected: self.issuer.clone(),
            },
            ErrorKind::InvalidAudience => VerifyError::AudienceMismatch {
                expected: self.audience.clone().unwrap_or_default(),
            },
            ErrorKind::InvalidSignature => {
                VerifyError::SignatureInvalid("signature verification failed".to_string())
            }
            ErrorKind::InvalidAlgorithm => {
                VerifyError::SignatureInvalid("token algorithm is not allowed".to_string())
            }
            _ => VerifyError::InvalidFormat(err.to_string()),
        }
    }
}
