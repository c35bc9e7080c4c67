pub mod session;

pub use session::{OptionalSession, SafeSession, Session};
