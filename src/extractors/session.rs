use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    cookies::parse_cookie_header,
    error::AuthError,
    middleware::AuthState,
    provider::AuthProvider,
    session::{SessionPayload, SessionResult},
    token::TokenVerifier,
};

/// The authenticated user. Rejects the request when there is no valid session.
///
/// Reuses the payload stored by [`session_middleware`](crate::session_middleware)
/// when it ran for this request.
pub struct Session(pub SessionPayload);

pub struct OptionalSession(pub Option<SessionPayload>);

/// The raw [`SessionResult`] for handlers that render errors themselves.
pub struct SafeSession(pub SessionResult);

impl<P, V> FromRequestParts<AuthState<P, V>> for Session
where
    P: AuthProvider,
    V: TokenVerifier,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<P, V>,
    ) -> std::result::Result<Self, Self::Rejection> {
        if let Some(payload) = parts.extensions.get::<SessionPayload>() {
            return Ok(Session(payload.clone()));
        }

        let cookies = parse_cookie_header(&parts.headers);
        let payload = state.verifier.resolve(cookies).await?;

        Ok(Session(payload))
    }
}

impl<P, V> FromRequestParts<AuthState<P, V>> for OptionalSession
where
    P: AuthProvider,
    V: TokenVerifier,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<P, V>,
    ) -> std::result::Result<Self, Self::Rejection> {
        match Session::from_request_parts(parts, state).await {
            Ok(Session(payload)) => Ok(OptionalSession(Some(payload))),
            Err(_) => Ok(OptionalSession(None)),
        }
    }
}

impl<P, V> FromRequestParts<AuthState<P, V>> for SafeSession
where
    P: AuthProvider,
    V: TokenVerifier,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<P, V>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let cookies = parse_cookie_header(&parts.headers);
        Ok(SafeSession(state.verifier.get_safe_session(cookies).await))
    }
}
