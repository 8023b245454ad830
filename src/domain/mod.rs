pub mod types;

pub use types::{SessionId, SessionIdError, Turn, TurnRole};
