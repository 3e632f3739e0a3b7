//! Auth form state machines.
//!
//! Each view moves through `Idle → Submitting → (Success | Failed)` and
//! allows one request in flight at a time. A view can be driven in one step
//! with `submit`, or split into `begin_submit` / `finish` when the request
//! runs on another task.

pub mod login;
pub mod signup;

pub use login::LoginView;
pub use signup::SignupView;

/// Landing route after a successful login
pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";

/// Shown when a login failure carries no usable message
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// Shown when a signup failure carries no usable message
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed. Please try again.";

pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful! Now you can login.";

/// Capability to move the user to another route
pub trait Navigator {
    fn navigate(&mut self, path: &str);
}

/// Submission state shared by the auth views
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed(String),
}

impl ViewState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, ViewState::Submitting)
    }

    /// Error message to display, if the last attempt failed
    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
