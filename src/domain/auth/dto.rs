use crate::domain::user::UserProfile;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Credential pair issued by `/login` and `/refresh`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_expires_in: i64,
}

impl Tokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
            expires_in: 0,
            refresh_expires_in: 0,
        }
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// Refresh token request
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Payload of a successful `/refresh`
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub tokens: Tokens,
}

/// Body sent to `/login`: the platform login code plus any extra fields
/// the caller collected (encrypted profile data and the like).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub tokens: Tokens,
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub coupons: Option<Vec<Value>>,
    #[serde(default)]
    pub privileges: Option<Vec<Value>>,
}

/// Payload of `GET /user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub coupons: Option<Vec<Value>>,
    #[serde(default)]
    pub privileges: Option<Vec<Value>>,
}

/// Encrypted phone number payload for `/decrypt-phone`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptPhoneRequest {
    pub encrypted_data: String,
    pub iv: String,
    pub code: String,
}
