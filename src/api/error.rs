use serde::Deserialize;
use thiserror::Error;

use crate::auth::RefreshError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - access token rejected")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential storage: {0}")]
    Credentials(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session expired: {0}")]
    Refresh(#[from] RefreshError),
}

impl ApiError {
    /// True for the one status that triggers the refresh flow.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// The backend wraps most error messages as `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    /// Pull the human-readable `detail` out of an error body, falling back
    /// to the (truncated) raw text for non-standard responses.
    fn extract_detail(body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return parsed.detail;
        }
        Self::truncate_body(body)
    }

    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::extract_detail(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(detail),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, detail)),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn maps_status_codes() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Not enough stock."}"#),
            ApiError::BadRequest(detail) if detail == "Not enough stock."
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerError(detail) if detail == "boom"
        ));
    }

    #[test]
    fn only_unauthorized_triggers_refresh() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(!ApiError::from_status(StatusCode::FORBIDDEN, "").is_auth_failure());
        assert!(!ApiError::Refresh(RefreshError::TimedOut).is_auth_failure());
    }

    #[test]
    fn truncates_oversized_bodies() {
        let body = "x".repeat(2000);
        let ApiError::BadRequest(detail) =
            ApiError::from_status(StatusCode::BAD_REQUEST, &body)
        else {
            panic!("expected BadRequest");
        };
        assert!(detail.len() < body.len());
        assert!(detail.contains("truncated"));
    }
}
