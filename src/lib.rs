pub mod config;
pub mod cookies;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod provider;
pub mod session;
pub mod token;

pub use config::VerifierConfig;
pub use cookies::{extract_tokens_from_cookies, parse_cookie_header};
pub use error::{AuthError, Result};
pub use extractors::{OptionalSession, SafeSession, Session};
pub use middleware::{AuthState, session_middleware};
pub use provider::{AuthProvider, ProviderError, RefreshedSession, User};
pub use session::{SessionPayload, SessionResult, SessionVerifier};
pub use token::{
    AccessTokenClaims, Audience, AuthTokens, JwtVerifier, TokenVerifier, VerifyError,
    VerifyErrorKind,
};

pub mod prelude {
    pub use crate::{
        config::VerifierConfig,
        error::{AuthError, Result},
        extractors::{OptionalSession, SafeSession, Session},
        middleware::{AuthState, session_middleware},
        provider::{AuthProvider, ProviderError, RefreshedSession, User},
        session::{SessionPayload, SessionResult, SessionVerifier},
        token::{
            AccessTokenClaims, Audience, AuthTokens, JwtVerifier, TokenVerifier, VerifyErrorKind,
        },
    };
}
