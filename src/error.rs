use serde::{Deserialize, Serialize};

/// Default message when the backend signals failure without one
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Main client error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// No HTTP response at all (DNS, connect, timeout)
    #[error("Network request failed: {0}")]
    Transport(String),

    /// Completed exchange with a non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope signals failure
    #[error("{message}")]
    Business { code: Option<i64>, message: String },

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to decode payload: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),
}

/// Error body shape some endpoints return alongside a non-2xx status
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ClientError {
    /// HTTP status carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the user in the transient error notice
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Network request failed".to_string(),
            Self::Http { status, .. } => format!("Request failed ({})", status),
            Self::Business { message, .. } => message.clone(),
            Self::RefreshFailed(_) => "Session expired, please sign in again".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. } | Self::RefreshFailed(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Custom result type for the client
pub type ClientResult<T> = Result<T, ClientError>;
