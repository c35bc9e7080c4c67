use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    config::VerifierConfig,
    cookies::extract_tokens_from_cookies,
    error::{AuthError, Result},
    provider::{AuthProvider, User},
    token::{
        AccessTokenClaims, AmrEntry, Audience, AuthTokens, AuthenticatorAssuranceLevel,
        JwtVerifier, TokenVerifier,
    },
};

/// The user behind a request, in one shape whichever path produced it.
///
/// `id` and `sub` always hold the same identifier. A verified access token
/// names the user in `sub`, so `id` is copied from it; a refreshed user
/// record names it `id`, so `sub` is copied the other way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub id: String,
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
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<AccessTokenClaims> for SessionPayload {
    fn from(mut claims: AccessTokenClaims) -> Self {
        claims.extra.remove("id");

        Self {
            id: claims.sub.clone(),
            sub: claims.sub,
            aud: claims.aud,
            exp: claims.exp,
            iat: claims.iat,
            iss: claims.iss,
            role: claims.role,
            email: claims.email,
            phone: claims.phone,
            is_anonymous: claims.is_anonymous,
            app_metadata: claims.app_metadata,
            user_metadata: claims.user_metadata,
            session_id: claims.session_id,
            aal: claims.aal,
            amr: claims.amr,
            extra: claims.extra,
        }
    }
}

impl From<User> for SessionPayload {
    fn from(mut user: User) -> Self {
        user.extra.remove("sub");

        Self {
            sub: user.id.clone(),
            id: user.id,
            aud: user.aud.map(Audience::Single),
            exp: None,
            iat: None,
            iss: None,
            role: user.role,
            email: user.email,
            phone: user.phone,
            is_anonymous: user.is_anonymous,
            app_metadata: user.app_metadata,
            user_metadata: user.user_metadata,
            session_id: None,
            aal: None,
            amr: None,
            extra: user.extra,
        }
    }
}

/// Outcome of [`SessionVerifier::get_safe_session`].
///
/// Serializes as `{"status":"success","data":{..}}` or
/// `{"status":"error","error":".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionResult {
    Success { data: SessionPayload },
    Error { error: String },
}

impl SessionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionResult::Success { .. })
    }

    pub fn data(&self) -> Option<&SessionPayload> {
        match self {
            SessionResult::Success { data } => Some(data),
            SessionResult::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionResult::Success { .. } => None,
            SessionResult::Error { error } => Some(error),
        }
    }

    pub fn into_result(self) -> std::result::Result<SessionPayload, String> {
        match self {
            SessionResult::Success { data } => Ok(data),
            SessionResult::Error { error } => Err(error),
        }
    }
}

impl From<AuthError> for SessionResult {
    fn from(err: AuthError) -> Self {
        SessionResult::Error {
            error: err.to_string(),
        }
    }
}

impl From<Result<SessionPayload>> for SessionResult {
    fn from(result: Result<SessionPayload>) -> Self {
        match result {
            Ok(data) => SessionResult::Success { data },
            Err(e) => e.into(),
        }
    }
}

/// Turns the cookies of a request into a verified session.
///
/// The access token is checked locally; only when it has expired is the
/// provider asked, once, to exchange the pair for a new session. The verifier
/// holds no per-request state and can be shared freely between requests.
pub struct SessionVerifier<P, V = JwtVerifier> {
    provider: P,
    verifier: V,
}

impl<P: AuthProvider> SessionVerifier<P> {
    pub fn new(provider: P, jwt_secret: impl Into<String>) -> Self {
        Self::from_config(provider, &VerifierConfig::new(jwt_secret.into()))
    }

    pub fn from_config(provider: P, config: &VerifierConfig) -> Self {
        Self::with_verifier(provider, JwtVerifier::new(config))
    }
}

impl<P: AuthProvider, V: TokenVerifier> SessionVerifier<P, V> {
    pub fn with_verifier(provider: P, verifier: V) -> Self {
        Self { provider, verifier }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Resolve the session carried by `cookies`.
    ///
    /// Never fails: every problem is reported through [`SessionResult::Error`].
    pub async fn get_safe_session<I, K, C>(&self, cookies: I) -> SessionResult
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: AsRef<str>,
    {
        self.resolve(cookies).await.into()
    }

    /// Same as [`get_safe_session`](Self::get_safe_session), keeping the typed error.
    pub async fn resolve<I, K, C>(&self, cookies: I) -> Result<SessionPayload>
    where
        I: IntoIterator<Item = (K, C)>,
        K: AsRef<str>,
        C: AsRef<str>,
    {
        let tokens = extract_tokens_from_cookies(cookies).ok_or(AuthError::TokensNotFound)?;
        self.verify_or_refresh(&tokens).await
    }

    async fn verify_or_refresh(&self, tokens: &AuthTokens) -> Result<SessionPayload> {
        match self.verifier.verify(&tokens.access_token) {
            Ok(claims) => {
                tracing::debug!(sub = %claims.sub, "access token verified");
                Ok(claims.into())
            }
            Err(e) if e.is_expired() => {
                tracing::info!("access token expired, refreshing session");
                self.refresh(tokens).await
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind, "access token rejected: {}", e.reason);
                Err(AuthError::VerificationFailed)
            }
        }
    }

    async fn refresh(&self, tokens: &AuthTokens) -> Result<SessionPayload> {
        let session = self.provider.set_session(tokens).await.map_err(|e| {
            tracing::warn!("session refresh rejected by provider: {e}");
            AuthError::Provider(e.message)
        })?;

        let user = session.user.ok_or_else(|| {
            tracing::warn!("provider refreshed the session without a user");
            AuthError::MissingRefreshedUser
        })?;

        tracing::debug!(id = %user.id, "session refreshed");
        Ok(user.into())
    }
}
