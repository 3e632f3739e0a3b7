//! Core library for the SkillShare+ client.
//!
//! - `auth`: Session token storage, the session store and its distribution context
//! - `api`: HTTP client for the SkillShare+ REST API
//! - `models`: Request/response types (roles, courses, signup confirmation)
//! - `views`: Login and signup form state machines
//! - `config`: Application configuration and directory layout

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionContext, SessionStore, SessionSubscription, SessionToken};
pub use config::Config;
