use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use time::Duration;

/// Settings for verifying Supabase access tokens.
///
/// The defaults match what the provider's own tooling accepts: any HMAC
/// algorithm, no clock leeway, and no audience or issuer checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    pub jwt_secret: String,
    pub algorithms: Vec<Algorithm>,
    pub leeway: Duration,
    pub audience: Option<String>,
    pub issuer: Option<String>,
}

impl VerifierConfig {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            algorithms: vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512],
            leeway: Duration::ZERO,
            audience: None,
            issuer: None,
        }
    }

    pub fn with_audience(mut self, audience: String) -> Self {
        self.audience = Some(audience);
        self
    }

    pub fn with_issuer(mut self, issuer: String) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }
}
