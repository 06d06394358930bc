use crate::error::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("storage error: {0}")]
    Storage(ClientError),
    #[error("invalid product: {0}")]
    InvalidProduct(String),
}

impl From<ClientError> for FavoritesError {
    fn from(err: ClientError) -> Self {
        FavoritesError::Storage(err)
    }
}

impl From<FavoritesError> for ClientError {
    fn from(err: FavoritesError) -> Self {
        match err {
            FavoritesError::Storage(inner) => inner,
            FavoritesError::InvalidProduct(msg) => ClientError::BadRequest(msg),
        }
    }
}
