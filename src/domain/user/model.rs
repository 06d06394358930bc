use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PERMISSION_CUSTOMER_MANAGEMENT: &str = "customer_management";
pub const PERMISSION_USER_MANAGEMENT: &str = "user_management";
pub const PERMISSION_PRODUCT_MANAGEMENT: &str = "product_management";
pub const PERMISSION_ORDER_MANAGEMENT: &str = "order_management";
pub const PERMISSION_ADMIN: &str = "admin";

const STATUS_ADMIN: i64 = 1;
const STATUS_NORMAL: i64 = 0;

/// Signed-in user as returned by the backend.
///
/// Only the fields the client reads are typed; everything else is kept in
/// `extra` so a profile round-trips through storage unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 1 = admin, 0 = normal user; the backend sends either a number or a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default)]
    pub coupons: Vec<Value>,
    #[serde(default)]
    pub privileges: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn status_code(&self) -> Option<i64> {
        match self.status.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.status_code() == Some(STATUS_ADMIN)
    }

    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or("Guest")
    }

    /// Overlay `other` onto this profile; fields present in `other` win
    pub fn merge(&mut self, other: UserProfile) {
        if other.id.is_some() {
            self.id = other.id;
        }
        if other.nickname.is_some() {
            self.nickname = other.nickname;
        }
        if other.avatar.is_some() {
            self.avatar = other.avatar;
        }
        if other.phone.is_some() {
            self.phone = other.phone;
        }
        if other.status.is_some() {
            self.status = other.status;
        }
        if !other.coupons.is_empty() {
            self.coupons = other.coupons;
        }
        if !other.privileges.is_empty() {
            self.privileges = other.privileges;
        }
        self.extra.extend(other.extra);
    }
}

/// Audience the navigation bar is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Anonymous,
    Normal,
    Admin,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Anonymous => write!(f, "anonymous"),
            UserType::Normal => write!(f, "normal"),
            UserType::Admin => write!(f, "admin"),
        }
    }
}

impl UserType {
    pub fn resolve(is_logged_in: bool, profile: Option<&UserProfile>) -> Self {
        match (is_logged_in, profile.and_then(UserProfile::status_code)) {
            (true, Some(STATUS_ADMIN)) => UserType::Admin,
            (true, Some(STATUS_NORMAL)) => UserType::Normal,
            _ => UserType::Anonymous,
        }
    }
}

/// Permissions granted for a profile; only admins get any
pub fn permissions_for(profile: Option<&UserProfile>) -> Vec<String> {
    match profile.and_then(UserProfile::status_code) {
        Some(STATUS_ADMIN) => [
            PERMISSION_CUSTOMER_MANAGEMENT,
            PERMISSION_USER_MANAGEMENT,
            PERMISSION_PRODUCT_MANAGEMENT,
            PERMISSION_ORDER_MANAGEMENT,
            PERMISSION_ADMIN,
        ]
        .iter()
        .map(|p| p.to_string())
        .collect(),
        _ => Vec::new(),
    }
}
