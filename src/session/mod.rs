//! Session module
//!
//! Persistence of the access token, refresh token and signed-in user.

pub mod manager;
pub mod store;

pub use manager::{token_expiry, AuthState, Session};
pub use store::{build_store, AuthStore, FileAuthStore, MemoryAuthStore, RedisAuthStore};
