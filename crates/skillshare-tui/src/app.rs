//! Application state management for the SkillShare+ terminal client.
//!
//! This module contains the core `App` struct that owns the session, the API
//! client, the auth form views and the router, and coordinates the background
//! tasks that run API requests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use skillshare_core::api::{ApiClient, ApiError};
use skillshare_core::auth::{SessionContext, SessionSubscription, SessionToken};
use skillshare_core::config::Config;
use skillshare_core::models::{Course, SignupConfirmation};
use skillshare_core::views::{
    LoginView, Navigator, SignupView, ViewState, HOME_PATH, LOGIN_PATH, SIGNUP_PATH,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Each view has at most one request in flight, plus one course refresh.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variables that pre-fill the login form
const EMAIL_ENV: &str = "SKILLSHARE_EMAIL";
const PASSWORD_ENV: &str = "SKILLSHARE_PASSWORD";

// ============================================================================
// Routing
// ============================================================================

/// Screens reachable by path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Home,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            LOGIN_PATH => Some(Route::Login),
            SIGNUP_PATH => Some(Route::Signup),
            HOME_PATH => Some(Route::Home),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => LOGIN_PATH,
            Route::Signup => SIGNUP_PATH,
            Route::Home => HOME_PATH,
        }
    }

    /// Get the display title for this route.
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Signup => "Signup",
            Route::Home => "Courses",
        }
    }
}

/// Current screen. The auth views move it through `Navigator`.
#[derive(Debug)]
pub struct Router {
    current: Route,
}

impl Router {
    pub fn new(start: Route) -> Self {
        Self { current: start }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn go(&mut self, route: Route) {
        if self.current != route {
            debug!(from = self.current.path(), to = route.path(), "Navigating");
        }
        self.current = route;
    }
}

impl Navigator for Router {
    fn navigate(&mut self, path: &str) {
        match Route::from_path(path) {
            Some(route) => self.go(route),
            None => warn!(path, "Ignoring navigation to unknown path"),
        }
    }
}

// ============================================================================
// UI State Types
// ============================================================================

/// What the title bar reports about the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SignedOut,
    SignedIn,
    /// A token is stored but the server refused it
    Rejected,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Signup form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupFocus {
    Email,
    Password,
    Role,
    Button,
}

impl SignupFocus {
    pub fn next(&self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Password,
            SignupFocus::Password => SignupFocus::Role,
            SignupFocus::Role => SignupFocus::Button,
            SignupFocus::Button => SignupFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignupFocus::Email => SignupFocus::Button,
            SignupFocus::Password => SignupFocus::Email,
            SignupFocus::Role => SignupFocus::Password,
            SignupFocus::Button => SignupFocus::Role,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned request tasks back to the main loop.
enum TaskResult {
    Login(Result<SessionToken, ApiError>),
    Signup(Result<SignupConfirmation, ApiError>),
    /// Tagged with the token the request was sent with
    Courses {
        token: SessionToken,
        result: Result<Vec<Course>, ApiError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    /// Where `config` is saved; `None` keeps changes in memory
    config_path: Option<PathBuf>,
    pub session: SessionContext,
    pub api: ApiClient,
    pub router: Router,

    // UI State
    pub state: AppState,

    // Login form state
    pub login: LoginView,
    pub login_focus: LoginFocus,
    pub show_password: bool,

    // Signup form state
    pub signup: SignupView,
    pub signup_focus: SignupFocus,

    // Home screen data
    pub courses: Vec<Course>,
    pub course_selection: usize,
    /// Token of the course request in flight, if any
    courses_request: Option<SessionToken>,
    /// Set when the server refused the current token
    session_rejected: bool,

    // Status message
    pub status_message: Option<String>,

    session_events: SessionSubscription,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl App {
    /// Create the application from saved configuration
    pub fn new(config: Config) -> Result<Self> {
        let store = config.open_session()?;
        let session = SessionContext::new(Arc::new(store));
        let api = ApiClient::new(config.api_base_url(), session.clone())?;

        let mut app = Self::from_parts(config, session, api);
        app.config_path = Config::config_path().ok();

        // Get credentials from env vars or config
        if let Ok(email) = std::env::var(EMAIL_ENV) {
            app.login.email = email;
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            app.login.password = password;
        }
        Ok(app)
    }

    /// Assemble the application around an existing session and client
    pub fn from_parts(config: Config, session: SessionContext, api: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let session_events = session.subscribe();

        let start = if session.is_authenticated() {
            Route::Home
        } else {
            Route::Login
        };
        debug!(start = start.path(), "App created");

        let login = match config.last_email {
            Some(ref email) => LoginView::with_email(email.clone()),
            None => LoginView::new(),
        };

        Self {
            config,
            config_path: None,
            session,
            api,
            router: Router::new(start),

            state: AppState::Normal,

            login,
            login_focus: LoginFocus::Email,
            show_password: false,

            signup: SignupView::new(),
            signup_focus: SignupFocus::Email,

            courses: Vec::new(),
            course_selection: 0,
            courses_request: None,
            session_rejected: false,

            status_message: None,

            session_events,

            task_rx: rx,
            task_tx: tx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session_status(&self) -> SessionStatus {
        if !self.is_authenticated() {
            SessionStatus::SignedOut
        } else if self.session_rejected {
            SessionStatus::Rejected
        } else {
            SessionStatus::SignedIn
        }
    }

    /// Show the login screen with focus on the first empty field
    pub fn start_login(&mut self) {
        self.router.go(Route::Login);
        self.login_focus = if self.login.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    /// Submit the login form on a background task
    pub fn submit_login(&mut self) {
        let Some(credentials) = self.login.begin_submit() else {
            if !self.login.is_submitting() {
                self.status_message = Some("Email and password required".to_string());
            }
            return;
        };
        self.status_message = None;
        info!("Submitting login");

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.login(credentials).await;
            Self::send_result(&tx, TaskResult::Login(result)).await;
        });
    }

    /// Submit the signup form on a background task
    pub fn submit_signup(&mut self) {
        let Some(credentials) = self.signup.begin_submit() else {
            return;
        };
        self.status_message = None;
        info!(role = %credentials.role, "Submitting signup");

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.signup(credentials).await;
            Self::send_result(&tx, TaskResult::Signup(result)).await;
        });
    }

    /// Clear the session. The session subscription routes back to login.
    pub fn logout(&mut self) {
        match self.session.set_token(None) {
            Ok(()) => {
                info!("Logged out");
                self.status_message = Some("Logged out".to_string());
            }
            Err(e) => {
                error!(error = %e, "Failed to clear session");
                self.status_message = Some(format!("Logout failed: {}", e));
            }
        }
    }

    /// Switch screens. The home screen requires a session.
    pub fn navigate(&mut self, route: Route) {
        if route == Route::Home && !self.is_authenticated() {
            self.status_message = Some("Please log in first".to_string());
            self.start_login();
            return;
        }
        self.router.go(route);
    }

    // =========================================================================
    // Courses
    // =========================================================================

    /// Fetch the course catalog in the background.
    ///
    /// At most one request per token is in flight; a request still running
    /// for a replaced token does not block a new one.
    pub fn refresh_courses(&mut self) {
        let Some(token) = self.session.token() else {
            return;
        };
        if self.courses_request.as_ref() == Some(&token) {
            return;
        }
        self.courses_request = Some(token.clone());

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.list_courses().await;
            Self::send_result(&tx, TaskResult::Courses { token, result }).await;
        });
    }

    /// Whether a course request for the current session is in flight
    pub fn courses_loading(&self) -> bool {
        self.courses_request.is_some() && self.courses_request == self.session.token()
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.courses.get(self.course_selection)
    }

    pub fn select_next_course(&mut self, step: usize) {
        let max_index = self.courses.len().saturating_sub(1);
        self.course_selection = (self.course_selection + step).min(max_index);
    }

    pub fn select_prev_course(&mut self, step: usize) {
        self.course_selection = self.course_selection.saturating_sub(step);
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Apply finished background tasks and session changes.
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_task_result(result);
        }

        if self.session_events.has_changed() {
            let token = self.session_events.mark_seen();
            self.on_session_changed(token.is_some());
        }
    }

    /// Wait for one background task to finish and apply it
    #[cfg(test)]
    pub async fn wait_for_task(&mut self) {
        if let Some(result) = self.task_rx.recv().await {
            self.process_task_result(result);
        }
        self.check_background_tasks();
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Login(outcome) => {
                self.login.finish(outcome, &self.session, &mut self.router);
                if self.login.state() == &ViewState::Success {
                    self.remember_email();
                }
            }
            TaskResult::Signup(outcome) => {
                self.signup.finish(outcome);
                if self.signup.confirmation().is_some() && self.login.email.is_empty() {
                    self.login.email = self.signup.email.clone();
                }
            }
            TaskResult::Courses { token, result } => {
                if self.courses_request.as_ref() == Some(&token) {
                    self.courses_request = None;
                }
                if self.session.token().as_ref() != Some(&token) {
                    debug!("Ignoring course results for a replaced session");
                    return;
                }
                match result {
                    Ok(courses) => {
                        debug!(count = courses.len(), "Courses loaded");
                        self.courses = courses;
                        self.course_selection = self
                            .course_selection
                            .min(self.courses.len().saturating_sub(1));
                    }
                    Err(e) if e.is_unauthorized() => {
                        warn!(error = %e, "Session rejected by server");
                        self.session_rejected = true;
                        self.status_message =
                            Some(e.user_message("Session rejected. Please log in again."));
                        self.start_login();
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load courses");
                        self.status_message = Some(e.user_message("Failed to load courses"));
                    }
                }
            }
        }
    }

    fn on_session_changed(&mut self, authenticated: bool) {
        debug!(authenticated, "Session changed");
        self.session_rejected = false;
        if authenticated {
            self.refresh_courses();
        } else {
            self.courses.clear();
            self.course_selection = 0;
            if self.router.current() == Route::Home {
                self.start_login();
            }
        }
    }

    fn remember_email(&mut self) {
        if self.config.last_email.as_deref() == Some(self.login.email.as_str()) {
            return;
        }
        self.config.last_email = Some(self.login.email.clone());
        let Some(ref path) = self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to(path) {
            warn!(error = %e, "Failed to save config");
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use skillshare_core::auth::{MemoryStorage, SessionStore, TOKEN_KEY};
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn test_app(base_url: &str, storage: &MemoryStorage) -> App {
        let session = SessionContext::new(Arc::new(SessionStore::open(storage.clone())));
        let api = ApiClient::new(base_url, session.clone()).expect("client builds");
        App::from_parts(Config::default(), session, api)
    }

    // -------------------------------------------------------------------------
    // Routing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_route_paths_round_trip() {
        for route in [Route::Login, Route::Signup, Route::Home] {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/dashboard"), None);
    }

    #[test]
    fn test_router_ignores_unknown_paths() {
        let mut router = Router::new(Route::Login);
        router.navigate("/nowhere");
        assert_eq!(router.current(), Route::Login);
        router.navigate(HOME_PATH);
        assert_eq!(router.current(), Route::Home);
    }

    #[test]
    fn test_start_route_follows_session() {
        let signed_out = test_app("http://localhost:8000", &MemoryStorage::new());
        assert_eq!(signed_out.router.current(), Route::Login);

        let signed_in = test_app("http://localhost:8000", &MemoryStorage::with_token("tok"));
        assert_eq!(signed_in.router.current(), Route::Home);
    }

    #[test]
    fn test_home_requires_session() {
        let mut app = test_app("http://localhost:8000", &MemoryStorage::new());
        app.navigate(Route::Signup);
        assert_eq!(app.router.current(), Route::Signup);

        app.navigate(Route::Home);
        assert_eq!(app.router.current(), Route::Login);
        assert!(app.status_message.is_some());
    }

    // -------------------------------------------------------------------------
    // Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Email.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Password.next(), LoginFocus::Button);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Email); // Wraps around
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Button);
    }

    #[test]
    fn test_signup_focus_cycle() {
        assert_eq!(SignupFocus::Email.next(), SignupFocus::Password);
        assert_eq!(SignupFocus::Password.next(), SignupFocus::Role);
        assert_eq!(SignupFocus::Role.next(), SignupFocus::Button);
        assert_eq!(SignupFocus::Button.next(), SignupFocus::Email); // Wraps around
        assert_eq!(SignupFocus::Email.prev(), SignupFocus::Button);
    }

    // -------------------------------------------------------------------------
    // Session Flow Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_flow_persists_token_and_loads_courses() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-abc",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/courses/"))
            .and(header("authorization", "Bearer tok-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Rust 101", "description": "Intro", "category": "Programming", "created_by": 3}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let storage = MemoryStorage::new();
        let mut app = test_app(&server.uri(), &storage);
        app.login.email = "a@b.com".to_string();
        app.login.password = "pw123".to_string();

        app.submit_login();
        assert!(app.login.is_submitting());

        // Second submit while in flight is ignored
        app.submit_login();

        app.wait_for_task().await;
        assert_eq!(app.login.state(), &ViewState::Success);
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-abc"));
        assert_eq!(app.router.current(), Route::Home);
        assert!(app.courses_loading());

        app.wait_for_task().await;
        assert!(!app.courses_loading());
        assert_eq!(app.courses.len(), 1);
        assert_eq!(app.selected_course().map(|c| c.id), Some(1));
    }

    #[tokio::test]
    async fn test_login_failure_shows_detail() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let storage = MemoryStorage::new();
        let mut app = test_app(&server.uri(), &storage);
        app.login.email = "a@b.com".to_string();
        app.login.password = "wrong".to_string();

        app.submit_login();
        app.wait_for_task().await;

        assert_eq!(app.login.error(), Some("Invalid email or password"));
        assert_eq!(app.router.current(), Route::Login);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn test_submit_login_with_empty_fields() {
        let mut app = test_app("http://localhost:8000", &MemoryStorage::new());
        app.submit_login();
        assert!(!app.login.is_submitting());
        assert_eq!(app.status_message.as_deref(), Some("Email and password required"));
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let storage = MemoryStorage::with_token("tok-abc");
        let mut app = test_app("http://localhost:8000", &storage);
        app.courses = vec![Course {
            id: 1,
            title: "Rust 101".to_string(),
            description: String::new(),
            category: "General".to_string(),
            created_by: 1,
        }];
        assert_eq!(app.router.current(), Route::Home);

        app.logout();
        app.check_background_tasks();

        assert!(!app.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(app.router.current(), Route::Login);
        assert!(app.courses.is_empty());
    }

    #[tokio::test]
    async fn test_signup_flow_keeps_session() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9,
                "email": "new@b.com",
                "role": "learner"
            })))
            .mount(&server)
            .await;

        let storage = MemoryStorage::new();
        let mut app = test_app(&server.uri(), &storage);
        app.navigate(Route::Signup);
        app.signup.email = "new@b.com".to_string();
        app.signup.password = "pw123".to_string();

        app.submit_signup();
        app.wait_for_task().await;

        assert_eq!(app.signup.state(), &ViewState::Success);
        assert!(!app.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(app.router.current(), Route::Signup);
        assert_eq!(app.login.email, "new@b.com");
    }

    #[tokio::test]
    async fn test_rejected_session_routes_to_login() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/courses/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "Invalid or expired token"
            })))
            .mount(&server)
            .await;

        let storage = MemoryStorage::with_token("stale");
        let mut app = test_app(&server.uri(), &storage);
        app.refresh_courses();
        app.wait_for_task().await;

        assert_eq!(app.router.current(), Route::Login);
        assert_eq!(app.status_message.as_deref(), Some("Invalid or expired token"));
        assert_eq!(app.session_status(), SessionStatus::Rejected);
        // Token stays until replaced by a new login or cleared by logout
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("stale"));

        // A new login clears the rejected state
        app.session.set_token(Some("fresh".to_string())).unwrap();
        app.check_background_tasks();
        assert_eq!(app.session_status(), SessionStatus::SignedIn);
    }

    fn unauthorized() -> ApiError {
        ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Invalid or expired token"}"#,
        )
    }

    #[tokio::test]
    async fn test_stale_course_result_is_ignored_after_new_login() {
        let storage = MemoryStorage::with_token("stale");
        let mut app = test_app("http://127.0.0.1:9", &storage);
        app.refresh_courses();
        assert!(app.courses_loading());

        // New login lands before the old request answers
        app.session.set_token(Some("fresh".to_string())).unwrap();
        app.router.go(Route::Home);
        app.check_background_tasks();
        assert!(app.courses_loading());

        app.process_task_result(TaskResult::Courses {
            token: SessionToken::new("stale").unwrap(),
            result: Err(unauthorized()),
        });

        assert_eq!(app.router.current(), Route::Home);
        assert_eq!(app.session_status(), SessionStatus::SignedIn);
        assert!(app.status_message.is_none());
        assert!(app.courses_loading());
    }

    #[tokio::test]
    async fn test_refresh_not_blocked_by_request_for_replaced_token() {
        let storage = MemoryStorage::with_token("stale");
        let mut app = test_app("http://127.0.0.1:9", &storage);
        app.refresh_courses();

        app.session.set_token(Some("fresh".to_string())).unwrap();
        assert!(!app.courses_loading());
        app.refresh_courses();
        assert_eq!(
            app.courses_request.as_ref().map(SessionToken::as_str),
            Some("fresh")
        );
        assert!(app.courses_loading());

        // Same token: no second request
        app.refresh_courses();
        assert!(app.courses_loading());
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(253, '@'));
        // Exceeds max length
        assert!(!can_add_email_char(254, 'a'));
        // Control characters rejected
        assert!(!can_add_email_char(0, '\x00'));
        assert!(!can_add_email_char(0, '\n'));
        assert!(!can_add_email_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        // Exceeds max length
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(200, 'a'));
        // Control characters rejected
        assert!(!can_add_password_char(0, '\x00'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
