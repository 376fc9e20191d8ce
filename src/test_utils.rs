use crate::config::AuthConfig;
use crate::service::AuthenticationService;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::LevelFilter;
use openssl::rsa::Rsa;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_ISSUER: &str = "https://issuer.test";
pub const TEST_AUDIENCE: &str = "https://api.test";
pub const TEST_KID: &str = "test-key-1";

/// RSA keypair for signing test tokens and serving the matching JWKS.
pub struct TestKey {
    encoding_key: EncodingKey,
    modulus: String,
    exponent: String,
}

impl TestKey {
    pub fn generate() -> Self {
        let rsa = Rsa::generate(2048).expect("failed to generate RSA key");
        let pem = rsa
            .private_key_to_pem()
            .expect("failed to encode private key");
        let encoding_key =
            EncodingKey::from_rsa_pem(&pem).expect("failed to load private key PEM");
        Self {
            encoding_key,
            modulus: URL_SAFE_NO_PAD.encode(rsa.n().to_vec()),
            exponent: URL_SAFE_NO_PAD.encode(rsa.e().to_vec()),
        }
    }

    /// Base64url-encoded RSA modulus (the JWK `n` field).
    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    /// Base64url-encoded RSA public exponent (the JWK `e` field).
    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    /// The JWK entry for this key under the given kid.
    pub fn jwk(&self, kid: &str) -> Value {
        json!({
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": kid,
            "n": self.modulus,
            "e": self.exponent,
        })
    }

    /// A complete JWKS document containing only this key.
    pub fn jwks(&self, kid: &str) -> Value {
        json!({ "keys": [self.jwk(kid)] })
    }

    /// Sign claims into a compact JWT carrying the given kid in its header.
    pub fn sign(&self, kid: &str, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &self.encoding_key).expect("failed to sign test token")
    }

    /// Sign claims into a JWT whose header carries no kid at all.
    pub fn sign_without_kid(&self, claims: &Value) -> String {
        let header = Header::new(Algorithm::RS256);
        encode(&header, claims, &self.encoding_key).expect("failed to sign test token")
    }
}

/// Standard claims for a valid, unexpired token. Tests override fields as
/// needed before signing.
pub fn claims(sub: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": sub,
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "email": "user@example.com",
        "email_verified": true,
        "roles": ["user"],
        "permissions": ["read:data"],
    })
}

/// Test environment: a mock JWKS endpoint plus a service wired against it.
pub struct TestFixture {
    /// Mock server answering JWKS fetches
    pub jwks_mock: MockServer,
    /// The keypair the mock JWKS publishes
    pub key: TestKey,
    /// Configuration pointing at the mock
    pub config: AuthConfig,
    /// Service under test
    pub service: AuthenticationService,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build a fixture after applying `customize` to the test configuration.
    pub async fn with_config(customize: impl FnOnce(&mut AuthConfig)) -> Self {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let jwks_mock = MockServer::start().await;
        let key = TestKey::generate();
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key.jwks(TEST_KID)))
            .mount(&jwks_mock)
            .await;

        let mut config = AuthConfig::for_test_with_mocks(&jwks_mock);
        customize(&mut config);
        let service = AuthenticationService::from_config(&config).expect("failed to build service");

        Self {
            jwks_mock,
            key,
            config,
            service,
        }
    }

    /// A valid signed token for the given subject.
    pub fn token_for(&self, sub: &str) -> String {
        self.key.sign(TEST_KID, &claims(sub))
    }
}
