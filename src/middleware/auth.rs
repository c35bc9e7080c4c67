use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    cookies::parse_cookie_header,
    error::Result,
    provider::AuthProvider,
    session::{SessionPayload, SessionVerifier},
    token::{JwtVerifier, TokenVerifier},
};

/// Router state shared by the session middleware and extractors.
pub struct AuthState<P, V = JwtVerifier> {
    pub verifier: Arc<SessionVerifier<P, V>>,
}

impl<P, V> AuthState<P, V> {
    pub fn new(verifier: SessionVerifier<P, V>) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }
}

impl<P, V> Clone for AuthState<P, V> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
        }
    }
}

/// Resolve the session from the request cookies and make it available to
/// handlers as a [`SessionPayload`] extension.
///
/// Requests without a usable session are rejected with `401 Unauthorized`.
pub async fn session_middleware<P, V>(
    State(state): State<AuthState<P, V>>,
    mut request: Request,
    next: Next,
) -> Result<Response>
where
    P: AuthProvider + 'static,
    V: TokenVerifier + 'static,
{
    let cookies = parse_cookie_header(request.headers());

    let payload = state.verifier.resolve(cookies).await?;

    request.extensions_mut().insert::<SessionPayload>(payload);

    Ok(next.run(request).await)
}
