use crate::error::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum CustomerServiceError {
    #[error("dependency error: {0}")]
    Dependency(ClientError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
    #[error("a customer request is already in flight")]
    Busy,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ClientError> for CustomerServiceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::BadRequest(msg) => CustomerServiceError::Invalid(msg),
            ClientError::Decode(msg) => CustomerServiceError::Payload(msg),
            other => CustomerServiceError::Dependency(other),
        }
    }
}

impl From<CustomerServiceError> for ClientError {
    fn from(err: CustomerServiceError) -> Self {
        match err {
            CustomerServiceError::Dependency(inner) => inner,
            CustomerServiceError::Invalid(msg) => ClientError::BadRequest(msg),
            CustomerServiceError::Payload(msg) => ClientError::Decode(msg),
            CustomerServiceError::Busy => {
                ClientError::BadRequest("a customer request is already in flight".to_string())
            }
            CustomerServiceError::Other(e) => ClientError::Decode(e.to_string()),
        }
    }
}
