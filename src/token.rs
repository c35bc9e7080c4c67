use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::VerifierConfig;

/// The access/refresh pair stored by the provider in its session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticatorAssuranceLevel {
    Aal1,
    Aal2,
}

/// One authentication method used during the session, e.g. `password` or `otp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrEntry {
    pub method: String,
    pub timestamp: i64,
}

/// The `aud` claim, which may be a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(value) => value == audience,
            Audience::Multiple(values) => values.iter().any(|value| value == audience),
        }
    }
}

/// Claims carried by a Supabase access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aal: Option<AuthenticatorAssuranceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amr: Option<Vec<AmrEntry>>,
    /// Claims not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessTokenClaims {
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.exp.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyErrorKind {
    /// Signature checked out but `exp` is in the past.
    Expired,
    InvalidSignature,
    Malformed,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access token rejected ({kind:?}): {reason}")]
pub struct VerifyError {
    pub kind: VerifyErrorKind,
    pub reason: String,
}

impl VerifyError {
    pub fn new(kind: VerifyErrorKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.kind == VerifyErrorKind::Expired
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        let kind = match err.kind() {
            ErrorKind::ExpiredSignature => VerifyErrorKind::Expired,
            ErrorKind::InvalidSignature => VerifyErrorKind::InvalidSignature,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_) => VerifyErrorKind::Malformed,
            _ => VerifyErrorKind::Other,
        };

        VerifyError::new(kind, err.to_string())
    }
}

/// Checks an access token locally and decodes its claims.
///
/// Implementations must report an expired but otherwise valid token with
/// [`VerifyErrorKind::Expired`]; that is the only kind that leads to a refresh.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> std::result::Result<AccessTokenClaims, VerifyError>;
}

/// HMAC verifier keyed with the project's JWT secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &VerifierConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = config.algorithms.clone();
        validation.leeway = config.leeway.whole_seconds().max(0) as u64;
        // `exp` and `nbf` are checked when present but not required.
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;

        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key,
            validation,
        }
    }

    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self::new(&VerifierConfig::new(secret.into()))
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> std::result::Result<AccessTokenClaims, VerifyError> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}
