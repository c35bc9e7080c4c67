use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::token::AuthTokens;

/// User record returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
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
    /// Remaining profile fields such as `created_at` or `identities`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a successful session exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshedSession {
    pub user: Option<User>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Client for the auth provider's session endpoint.
///
/// # Example Implementation
///
/// ```rust
/// use supabase_session::{AuthProvider, AuthTokens, ProviderError, RefreshedSession};
///
/// struct RejectingProvider;
///
/// impl AuthProvider for RejectingProvider {
///     async fn set_session(
///         &self,
///         _tokens: &AuthTokens,
///     ) -> Result<RefreshedSession, ProviderError> {
///         Err(ProviderError::new("Invalid Refresh Token: Refresh Token Not Found"))
///     }
/// }
/// ```
pub trait AuthProvider: Send + Sync {
    /// Exchange a token pair for a fresh session.
    ///
    /// Called once when the access token has expired. Writing the new tokens
    /// back to the client is left to the implementation or the host framework.
    fn set_session(
        &self,
        tokens: &AuthTokens,
    ) -> impl std::future::Future<Output = std::result::Result<RefreshedSession, ProviderError>> + Send;
}
