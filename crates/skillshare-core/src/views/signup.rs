use std::fmt;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Role, SignupConfirmation, SignupCredentials};

use super::{ViewState, SIGNUP_FAILED_MESSAGE, SIGNUP_SUCCESS_MESSAGE};

/// Signup form: email, password and role.
///
/// Fields are sent as entered; the server validates them. Success never
/// touches the session.
#[derive(Default)]
pub struct SignupView {
    pub email: String,
    pub password: String,
    pub role: Role,
    state: ViewState,
    confirmation: Option<SignupConfirmation>,
}

impl fmt::Debug for SignupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupView")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SignupView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    /// Server response from the last successful signup
    pub fn confirmation(&self) -> Option<&SignupConfirmation> {
        self.confirmation.as_ref()
    }

    /// Outcome message for the user, success or failure
    pub fn message(&self) -> Option<&str> {
        match self.state {
            ViewState::Success => Some(SIGNUP_SUCCESS_MESSAGE),
            ViewState::Failed(ref message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting()
    }

    /// Enter `Submitting`, clearing the previous outcome.
    pub fn begin_submit(&mut self) -> Option<SignupCredentials> {
        if !self.can_submit() {
            return None;
        }
        self.state = ViewState::Submitting;
        self.confirmation = None;
        Some(SignupCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
            role: self.role,
        })
    }

    /// Apply the outcome of the request started by `begin_submit`
    pub fn finish(&mut self, outcome: Result<SignupConfirmation, ApiError>) {
        if !self.is_submitting() {
            warn!("Ignoring signup result with no submission in flight");
            return;
        }

        match outcome {
            Ok(confirmation) => {
                info!(role = %self.role, "Signup successful");
                self.password.clear();
                self.confirmation = Some(confirmation);
                self.state = ViewState::Success;
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                self.state = ViewState::Failed(e.user_message(SIGNUP_FAILED_MESSAGE));
            }
        }
    }

    /// Run one signup attempt to completion. Returns true on success.
    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        let Some(credentials) = self.begin_submit() else {
            return false;
        };
        let outcome = api.signup(credentials).await;
        self.finish(outcome);
        self.state == ViewState::Success
    }
}
