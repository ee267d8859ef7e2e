use reqwest::StatusCode;
use serde::Deserialize;

/// Errors a wire operation can produce. Cloneable so the cache can retain
/// the most recent failure alongside the last good value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never completed: connection, DNS or timeout trouble.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a non-success status.
    #[error("{status}: {message}")]
    Rejection { status: StatusCode, message: String },
    /// The service answered 2xx with a body that did not match the
    /// expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Builds a rejection from a response body, extracting the service's
    /// `{"error": "..."}` message when one is present.
    pub fn rejection(status: StatusCode, body: String) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error: String,
        }

        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) if body.is_empty() => status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string(),
            Err(_) => body,
        };
        ApiError::Rejection { status, message }
    }

    /// Status of the rejection, if this error is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the service refused the credentials attached to the
    /// request. The session is never cleared on this; callers decide how
    /// to prompt for a new login.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
