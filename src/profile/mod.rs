//! Profile module — per-user token storage.
//!
//! This module provides:
//! - `ProfileRecord`, `ProfileUpdate` and `TokenKind` (`record`)
//! - The `ProfileStore` trait and `MemoryProfileStore` (`store`)
//! - `FileProfileStore`, an HMAC-protected single-file store (`file`)
//! - `TokenService`, which encrypts on write and decrypts on read (`tokens`)

pub mod file;
pub mod record;
pub mod store;
pub mod tokens;

pub use file::FileProfileStore;
pub use record::{validate_user_id, ProfileRecord, ProfileUpdate, TokenKind};
pub use store::{MemoryProfileStore, ProfileStore};
pub use tokens::{TokenService, TokenStatus, UserTokens};
