use thiserror::Error;

/// Failure of an API call.
///
/// `Clone` so that one refresh outcome can be handed to every request queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("unauthorized (HTTP 401): {body}")]
    Unauthorized { body: String },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("refresh response carried no access token")]
    MissingAccessToken,
    #[error("token refresh failed: {0}")]
    Refresh(Box<ApiError>),
    #[error("token refresh was abandoned before it settled")]
    RefreshAborted,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Refresh(inner) => inner.status(),
            _ => None,
        }
    }

    /// The session can no longer be used and the user has to log in again.
    ///
    /// A refresh answered 2xx without an access token leaves the stored session in place.
    pub fn is_session_ended(&self) -> bool {
        match self {
            Self::Refresh(inner) => !matches!(**inner, Self::MissingAccessToken),
            Self::Unauthorized { .. } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
