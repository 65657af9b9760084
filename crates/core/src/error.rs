use serde::Serialize;
use thiserror::Error;

/// Unified API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Message shown to API clients, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::Internal(m) => m,
        }
    }
}

/// JSON error body: `{ "error": "…" }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(e: &ApiError) -> Self {
        Self {
            error: e.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_bare_message() {
        let err = ApiError::BadRequest("Invalid media type".into());
        assert_eq!(err.status_code(), 400);
        let body = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid media type" }));
    }
}
