pub mod access_log;
pub mod auth;

pub use access_log::access_log;
pub use auth::{token_guard, AuthUser};
