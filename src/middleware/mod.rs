pub mod auth;

pub use auth::{AuthState, session_middleware};
