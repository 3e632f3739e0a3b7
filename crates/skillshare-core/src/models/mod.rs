//! Data models for SkillShare+ API requests and responses.
//!
//! - `Role`, `LoginCredentials`, `SignupCredentials`: Auth request bodies
//! - `SignupConfirmation`: Opaque signup response
//! - `Course`: Catalog entries shown after login

pub mod course;
pub mod user;

pub use course::Course;
pub use user::{LoginCredentials, Role, SignupConfirmation, SignupCredentials};
