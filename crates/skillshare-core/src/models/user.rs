use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account role chosen at signup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Learner,
    Instructor,
    Admin,
}

impl Role {
    /// Wire value sent to the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    /// Get the display label for this role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Learner => "Learner",
            Role::Instructor => "Instructor",
            Role::Admin => "Admin",
        }
    }

    /// Get the next role (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Role::Learner => Role::Instructor,
            Role::Instructor => Role::Admin,
            Role::Admin => Role::Learner,
        }
    }

    /// Get the previous role (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Role::Learner => Role::Admin,
            Role::Instructor => Role::Learner,
            Role::Admin => Role::Instructor,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /auth/login`. Built for one request and dropped with it.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/signup`
#[derive(Clone, Serialize)]
pub struct SignupCredentials {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for SignupCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupCredentials")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Whatever the server returned for a successful signup.
///
/// Kept as raw JSON; the client only peeks at `email` for display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SignupConfirmation(pub Value);

impl SignupConfirmation {
    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_value(Role::Learner).unwrap(), json!("learner"));
        assert_eq!(serde_json::to_value(Role::Instructor).unwrap(), json!("instructor"));
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
        assert_eq!(Role::Instructor.to_string(), "instructor");
    }

    #[test]
    fn test_role_default_is_learner() {
        assert_eq!(Role::default(), Role::Learner);
    }

    #[test]
    fn test_role_next() {
        assert_eq!(Role::Learner.next(), Role::Instructor);
        assert_eq!(Role::Instructor.next(), Role::Admin);
        assert_eq!(Role::Admin.next(), Role::Learner); // Wraps around
    }

    #[test]
    fn test_role_prev() {
        assert_eq!(Role::Learner.prev(), Role::Admin); // Wraps around
        assert_eq!(Role::Admin.prev(), Role::Instructor);
        assert_eq!(Role::Instructor.prev(), Role::Learner);
    }

    #[test]
    fn test_signup_body_shape() {
        let body = SignupCredentials {
            email: "a@b.com".to_string(),
            password: "pw123".to_string(),
            role: Role::Instructor,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"email": "a@b.com", "password": "pw123", "role": "instructor"})
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = LoginCredentials {
            email: "a@b.com".to_string(),
            password: "pw123".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("pw123"));
    }

    #[test]
    fn test_signup_confirmation_is_opaque() {
        let confirmation: SignupConfirmation =
            serde_json::from_str(r#"{"id": 7, "email": "a@b.com", "role": "learner"}"#).unwrap();
        assert_eq!(confirmation.email(), Some("a@b.com"));

        let bare: SignupConfirmation = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.email(), None);
    }
}
