use crate::error::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("session expired")]
    Expired,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ClientError> for AuthServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Business { message, .. } => AuthServiceError::Rejected(message),
            ClientError::RefreshFailed(_) => AuthServiceError::Expired,
            ClientError::Http { status: 401, .. } => AuthServiceError::NotSignedIn,
            _ => AuthServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<AuthServiceError> for ClientError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Rejected(message) => ClientError::Business {
                code: None,
                message,
            },
            AuthServiceError::NotSignedIn => ClientError::Http {
                status: 401,
                message: "Not signed in".to_string(),
            },
            AuthServiceError::Expired => ClientError::RefreshFailed("session expired".to_string()),
            AuthServiceError::Dependency(msg) => ClientError::Transport(msg),
            AuthServiceError::Other(e) => ClientError::Transport(e.to_string()),
        }
    }
}
