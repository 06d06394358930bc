use super::error::AuthServiceError;
use super::session::{JUST_LOGGED_IN_STORAGE_KEY, LAST_LOGIN_TIME_STORAGE_KEY, SESSION_KEY_STORAGE_KEY};
use super::{DecryptPhoneRequest, LoginRequest, LoginResponse, Session, Tokens, UserInfoResponse};
use crate::domain::user::UserProfile;
use crate::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct AuthService {
    client: Arc<ApiClient>,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let session = client.session().clone();
        Self { client, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    async fn record_login_time(&self) {
        if let Err(e) = self
            .session
            .set_marker(LAST_LOGIN_TIME_STORAGE_KEY, json!(Utc::now().timestamp_millis()))
            .await
        {
            tracing::warn!(error = %e, "Failed to record login time");
        }
    }

    async fn apply_login(&self, response: LoginResponse) -> Result<(), AuthServiceError> {
        let mut user = response.user;
        user.coupons = response.coupons.unwrap_or_default();
        user.privileges = response.privileges.unwrap_or_default();

        let mut tokens: Tokens = response.tokens;
        if tokens.token_type.is_empty() {
            tokens.token_type = "bearer".to_string();
        }
        if !tokens.has_access_token() {
            return Err(AuthServiceError::Rejected("login returned no access token".to_string()));
        }

        self.session
            .replace_tokens(tokens)
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;
        self.session
            .set_user(user)
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;

        if let Some(session_key) = response.session_key {
            self.session
                .set_marker(SESSION_KEY_STORAGE_KEY, json!(session_key))
                .await
                .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;
        }
        self.record_login_time().await;
        Ok(())
    }

    /// Reset local auth state after a failed sign-in step, without navigating
    async fn discard_session(&self) {
        if let Err(e) = self.session.clear().await {
            tracing::error!(error = %e, "Failed to clear session");
        }
    }
}

#[async_trait]
pub trait AuthServiceApi: Send + Sync {
    /// Exchange a platform login code for tokens and a profile.
    ///
    /// On any failure the local session is cleared (no redirect).
    async fn login(&self, request: LoginRequest) -> Result<UserProfile, AuthServiceError>;

    /// Re-read the profile from `/user` and mark the session signed in.
    ///
    /// On any failure the local session is cleared (no redirect).
    async fn fetch_user_info(&self) -> Result<UserProfile, AuthServiceError>;

    /// Restore the persisted session and validate a token that has no
    /// confirmed profile yet. Returns whether the user ends up signed in.
    async fn check_login_status(&self) -> Result<bool, AuthServiceError>;

    /// Startup entry point: skips validation right after a fresh login
    async fn init_user_state(&self) -> Result<bool, AuthServiceError>;

    async fn logout(&self, redirect: bool) -> Result<(), AuthServiceError>;

    /// Ask the backend to decrypt the platform-encrypted phone number
    async fn decrypt_phone(&self, request: DecryptPhoneRequest) -> Result<Value, AuthServiceError>;
}

#[async_trait]
impl AuthServiceApi for AuthService {
    async fn login(&self, request: LoginRequest) -> Result<UserProfile, AuthServiceError> {
        self.session
            .set_marker(JUST_LOGGED_IN_STORAGE_KEY, json!("true"))
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;

        let outcome: Result<(), AuthServiceError> = async {
            let api_request = ApiRequest::post("/login")
                .public()
                .with_loading(true)
                .json(&request)?;
            let response: LoginResponse = self.client.send_as(api_request).await?;
            self.apply_login(response).await
        }
        .await;

        match outcome {
            Ok(()) => {
                let user = self.session.user().unwrap_or_default();
                tracing::info!(user_type = %self.session.user_type(), "Signed in");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.discard_session().await;
                Err(e)
            }
        }
    }

    async fn fetch_user_info(&self) -> Result<UserProfile, AuthServiceError> {
        let outcome: Result<UserInfoResponse, AuthServiceError> = self
            .client
            .send_as(ApiRequest::get("/user"))
            .await
            .map_err(AuthServiceError::from);

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Fetching user info failed");
                self.discard_session().await;
                return Err(e);
            }
        };

        let mut user = self.session.user().unwrap_or_default();
        let previous_coupons = std::mem::take(&mut user.coupons);
        let previous_privileges = std::mem::take(&mut user.privileges);
        user.merge(response.user);
        user.coupons = response.coupons.unwrap_or(previous_coupons);
        user.privileges = response.privileges.unwrap_or(previous_privileges);

        self.session
            .set_user(user.clone())
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;
        self.record_login_time().await;

        Ok(user)
    }

    async fn check_login_status(&self) -> Result<bool, AuthServiceError> {
        self.session
            .restore()
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;

        if self.session.access_token().is_some() && !self.session.is_logged_in() {
            if let Err(e) = self.fetch_user_info().await {
                tracing::info!(error = %e, "Stored token rejected");
                return Ok(false);
            }
        }

        tracing::debug!(user_type = %self.session.user_type(), "Login status checked");
        Ok(self.session.is_logged_in())
    }

    async fn init_user_state(&self) -> Result<bool, AuthServiceError> {
        let just_logged_in = self
            .session
            .take_marker(JUST_LOGGED_IN_STORAGE_KEY)
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;

        if just_logged_in.as_ref().and_then(Value::as_str) == Some("true") {
            tracing::debug!("Fresh login, skipping token validation");
            return Ok(self.session.is_logged_in());
        }

        self.check_login_status().await
    }

    async fn logout(&self, redirect: bool) -> Result<(), AuthServiceError> {
        self.session
            .clear()
            .await
            .map_err(|e| AuthServiceError::Dependency(e.to_string()))?;
        if redirect {
            self.client.ui().redirect_to_login();
        }
        Ok(())
    }

    async fn decrypt_phone(&self, request: DecryptPhoneRequest) -> Result<Value, AuthServiceError> {
        let api_request = ApiRequest::post("/decrypt-phone")
            .json(&request)
            .map_err(AuthServiceError::from)?;
        Ok(self.client.send(api_request).await?)
    }
}
