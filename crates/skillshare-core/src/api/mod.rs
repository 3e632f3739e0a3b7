//! REST API client module for the SkillShare+ service.
//!
//! This module provides the `ApiClient` for the auth endpoints
//! (`/auth/login`, `/auth/signup`) and the authenticated course catalog.
//!
//! Every request carries the current session token from the
//! `SessionContext` as a bearer credential when one is set.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
