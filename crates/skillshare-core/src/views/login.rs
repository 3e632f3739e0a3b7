use std::fmt;

use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{SessionContext, SessionToken};
use crate::models::LoginCredentials;

use super::{Navigator, ViewState, HOME_PATH, LOGIN_FAILED_MESSAGE};

/// Login form: email and password, both required.
#[derive(Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    state: ViewState,
}

impl fmt::Debug for LoginView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginView")
            .field("email", &self.email)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl LoginView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled with a remembered email
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
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

    /// Submission is allowed when both fields are filled and nothing is in flight
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && !self.email.is_empty() && !self.password.is_empty()
    }

    /// Enter `Submitting`, clearing any previous error.
    ///
    /// Returns the request body, or `None` if submission is not allowed.
    pub fn begin_submit(&mut self) -> Option<LoginCredentials> {
        if !self.can_submit() {
            return None;
        }
        self.state = ViewState::Submitting;
        Some(LoginCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }

    /// Apply the outcome of the request started by `begin_submit`.
    ///
    /// On success the token becomes the current session and the navigator is
    /// sent home. On failure the session is left alone and the message is
    /// kept for display.
    pub fn finish(
        &mut self,
        outcome: Result<SessionToken, ApiError>,
        session: &SessionContext,
        navigator: &mut impl Navigator,
    ) {
        if !self.is_submitting() {
            warn!("Ignoring login result with no submission in flight");
            return;
        }

        match outcome {
            Ok(token) => match session.set_token(Some(token.into_string())) {
                Ok(()) => {
                    self.password.clear();
                    self.state = ViewState::Success;
                    info!("Login successful");
                    navigator.navigate(HOME_PATH);
                }
                Err(e) => {
                    error!(error = %e, "Failed to save session");
                    self.state = ViewState::Failed(format!("Could not save session: {}", e));
                }
            },
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.state = ViewState::Failed(e.user_message(LOGIN_FAILED_MESSAGE));
            }
        }
    }

    /// Run one login attempt to completion. Returns true on success.
    pub async fn submit(&mut self, api: &ApiClient, navigator: &mut impl Navigator) -> bool {
        let Some(credentials) = self.begin_submit() else {
            return false;
        };
        let outcome = api.login(credentials).await;
        self.finish(outcome, api.session(), navigator);
        self.state == ViewState::Success
    }
}
