//! API client for communicating with the SkillShare+ REST API.
//!
//! This module provides the `ApiClient` struct. It reads the session token
//! from a `SessionContext` when each request is built, so a login through
//! one clone is visible to every other clone immediately.

use anyhow::Result;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use crate::auth::{SessionContext, SessionToken};
use crate::models::{Course, LoginCredentials, SignupConfirmation, SignupCredentials};

use super::ApiError;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// API client for SkillShare+.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Create a new API client. Requests are single-attempt with no timeout.
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Result<Self> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "API client created");

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Exchange credentials for a session token.
    ///
    /// Does not touch the session; the caller decides what to do with the
    /// token.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<SessionToken, ApiError> {
        let request = self.request(Method::POST, "/auth/login")?.json(&credentials);

        let auth: LoginResponse = self.send_json(request).await?;
        debug!(token_type = ?auth.token_type, "Login response received");

        auth.access_token
            .and_then(SessionToken::new)
            .ok_or(ApiError::MissingToken)
    }

    /// Register a new account. The session is left as it was.
    pub async fn signup(
        &self,
        credentials: SignupCredentials,
    ) -> Result<SignupConfirmation, ApiError> {
        let request = self.request(Method::POST, "/auth/signup")?.json(&credentials);

        self.send_json(request).await
    }

    /// Fetch the course catalog (requires a session)
    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let request = self.request(Method::GET, "/courses/")?;
        self.send_json(request).await
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ApiError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.auth_headers()?;
        debug!(%method, %url, authenticated = !headers.is_empty(), "Building request");

        Ok(self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json")
            .headers(headers))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %ApiError::truncate_body(&body), "Failed to parse response");
            ApiError::InvalidResponse(e.to_string())
        })
    }
}
