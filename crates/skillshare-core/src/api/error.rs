use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response. `detail` is the server's explanation, if it sent one.
    #[error("Request failed with status code {}", .status.as_u16())]
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No token returned from server")]
    MissingToken,

    #[error("Session token cannot be sent in a header")]
    InvalidToken,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Rejected {
            status,
            detail: extract_detail(body),
        }
    }

    /// Server-supplied detail message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::NetworkError(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Message to show the user.
    ///
    /// Prefers the server's detail, then a transport-level message, then
    /// `fallback`. Decoding errors are internal and always use `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            ApiError::InvalidResponse(_) => return fallback.to_string(),
            ApiError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(e) if e.is_connect() => {
                "Unable to connect to server. Check your network connection.".to_string()
            }
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Pull `detail` out of an error body.
///
/// FastAPI sends either a string or, for validation failures, a list of
/// objects with a `msg` field.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_string_detail() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Invalid email or password"}"#,
        );
        assert_eq!(err.detail(), Some("Invalid email or password"));
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message("fallback"), "Invalid email or password");
    }

    #[test]
    fn test_from_status_validation_detail() {
        let body = r#"{"detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"}, {"loc": ["body", "role"], "msg": "Input should be 'admin', 'instructor' or 'learner'", "type": "enum"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err.detail(),
            Some("value is not a valid email address; Input should be 'admin', 'instructor' or 'learner'")
        );
    }

    #[test]
    fn test_from_status_without_detail_uses_transport_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        assert_eq!(err.detail(), None);
        assert_eq!(
            err.user_message("Login failed."),
            "Request failed with status code 500"
        );

        let blank = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "  "}"#);
        assert_eq!(blank.detail(), None);

        let other = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": {"code": 4}}"#);
        assert_eq!(other.detail(), None);
    }

    #[test]
    fn test_invalid_response_uses_fallback() {
        let err = ApiError::InvalidResponse("expected value at line 1 column 1".to_string());
        assert_eq!(err.user_message("Login failed."), "Login failed.");
    }

    #[test]
    fn test_missing_token_message() {
        assert_eq!(
            ApiError::MissingToken.user_message("Login failed."),
            "No token returned from server"
        );
        assert_eq!(ApiError::MissingToken.status(), None);
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
