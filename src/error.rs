use reqwest::StatusCode;
use thiserror::Error;

/// Error taxonomy for a single tool call. Every variant is terminal for the
/// call that raised it; nothing is retried and no shared state is poisoned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    Validation(String),
    #[error("Tool not found: {0}")]
    UnknownTool(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exhausted{}: {message}", reset_hint(.reset_at))]
    RateLimited {
        message: String,
        reset_at: Option<String>,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

fn reset_hint(reset_at: &Option<String>) -> String {
    match reset_at {
        Some(at) => format!(" (resets at {})", at),
        None => String::new(),
    }
}

impl Error {
    /// Stable machine-readable code, used in tool error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::UnknownTool(_) => "unknown_tool",
            Error::Auth(_) => "auth",
            Error::NotFound(_) => "not_found",
            Error::RateLimited { .. } => "rate_limited",
            Error::Conflict(_) => "conflict",
            Error::Unprocessable(_) => "unprocessable",
            Error::Upstream(_) => "upstream_error",
        }
    }

    /// Classify a non-2xx upstream response. `reset_at` comes from the
    /// rate-limit headers when the caller extracted one.
    pub fn from_status(status: StatusCode, message: String, reset_at: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { message, reset_at },
            StatusCode::CONFLICT => Error::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => Error::Unprocessable(message),
            _ => Error::Upstream(format!("HTTP {}: {}", status.as_u16(), message)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Upstream(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matrix() {
        assert_eq!(
            Error::from_status(StatusCode::UNAUTHORIZED, "bad creds".into(), None).code(),
            "auth"
        );
        assert_eq!(
            Error::from_status(StatusCode::FORBIDDEN, "".into(), None).code(),
            "auth"
        );
        assert_eq!(
            Error::from_status(StatusCode::NOT_FOUND, "".into(), None).code(),
            "not_found"
        );
        assert_eq!(
            Error::from_status(StatusCode::CONFLICT, "".into(), None).code(),
            "conflict"
        );
        assert_eq!(
            Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, "".into(), None).code(),
            "unprocessable"
        );
        assert_eq!(
            Error::from_status(StatusCode::TOO_MANY_REQUESTS, "".into(), None).code(),
            "rate_limited"
        );
        assert_eq!(
            Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "".into(), None).code(),
            "upstream_error"
        );
    }

    #[test]
    fn rate_limit_message_carries_reset_time() {
        let e = Error::from_status(
            StatusCode::TOO_MANY_REQUESTS,
            "API rate limit exceeded".into(),
            Some("2025-01-01T00:00:00+00:00".into()),
        );
        let msg = e.to_string();
        assert!(msg.contains("resets at 2025-01-01T00:00:00+00:00"), "{}", msg);
        assert!(msg.contains("API rate limit exceeded"));
    }
}
