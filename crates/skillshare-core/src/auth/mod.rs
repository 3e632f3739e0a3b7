//! Authentication module for holding and distributing the session token.
//!
//! This module provides:
//! - `TokenStorage`: Durable key-value storage for the token (file, memory)
//! - `SessionStore`: Single source of truth for the current token
//! - `SessionContext`: Cheap handle exposing the token and its setter to consumers
//!
//! The token is opaque. It is persisted under the `token` key and read back
//! once when the store is opened.

pub mod context;
pub mod session;
pub mod storage;

pub use context::SessionContext;
pub use session::{SessionStore, SessionSubscription, SessionToken};
pub use storage::{FileStorage, MemoryStorage, TokenStorage, TOKEN_KEY};
