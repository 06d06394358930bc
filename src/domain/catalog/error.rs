use crate::error::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error("dependency error: {0}")]
    Dependency(ClientError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ClientError> for CatalogServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::BadRequest(msg) => CatalogServiceError::Invalid(msg),
            ClientError::Decode(msg) => CatalogServiceError::Payload(msg),
            other => CatalogServiceError::Dependency(other),
        }
    }
}

impl From<CatalogServiceError> for ClientError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::Dependency(inner) => inner,
            CatalogServiceError::Invalid(msg) => ClientError::BadRequest(msg),
            CatalogServiceError::Payload(msg) => ClientError::Decode(msg),
            CatalogServiceError::Other(e) => ClientError::Decode(e.to_string()),
        }
    }
}
