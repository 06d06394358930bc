pub mod dto;
pub mod error;
pub mod service;
pub mod session;

pub use dto::{
    DecryptPhoneRequest, LoginRequest, LoginResponse, RefreshResponse, RefreshTokenRequest,
    Tokens, UserInfoResponse,
};
pub use error::AuthServiceError;
pub use service::{AuthService, AuthServiceApi};
pub use session::{Session, SessionSnapshot, SESSION_STORAGE_KEY};
