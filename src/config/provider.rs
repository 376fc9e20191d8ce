use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::str::FromStr;

/// Token validation settings for the OAuth2 provider
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Provider name reported on authenticated users (default: "jwt")
    #[serde(default = "default_name")]
    pub name: String,

    /// Expected `iss` claim, matched exactly
    #[serde(default)]
    pub issuer: String,

    /// Expected `aud` claim; audience validation is skipped when unset
    #[serde(default)]
    pub audience: Option<String>,

    /// Allow-list of signature algorithms (default: RS256)
    #[serde(default = "default_algorithms")]
    pub allowed_algorithms: Vec<String>,

    /// Clock-skew leeway in seconds applied to time-based claims (default: 0)
    #[serde(default)]
    pub leeway: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            issuer: String::new(),
            audience: None,
            allowed_algorithms: default_algorithms(),
            leeway: 0,
        }
    }
}

impl ProviderConfig {
    /// Parses the algorithm allow-list, rejecting unknown names
    pub fn algorithms(&self) -> Result<Vec<Algorithm>, String> {
        if self.allowed_algorithms.is_empty() {
            return Err("allowed_algorithms must not be empty".to_string());
        }
        self.allowed_algorithms
            .iter()
            .map(|name| {
                Algorithm::from_str(name).map_err(|_| format!("unknown JWT algorithm: {name}"))
            })
            .collect()
    }
}

fn default_name() -> String {
    "jwt".to_string()
}

fn default_algorithms() -> Vec<String> {
    vec!["RS256".to_string()]
}
