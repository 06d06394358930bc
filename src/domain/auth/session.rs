use super::Tokens;
use crate::domain::user::{permissions_for, UserProfile, UserType, model::PERMISSION_CUSTOMER_MANAGEMENT};
use crate::error::ClientResult;
use crate::infrastructure::storage::SharedStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

/// Storage key holding the persisted session
pub const SESSION_STORAGE_KEY: &str = "user-store";
pub const SESSION_KEY_STORAGE_KEY: &str = "session_key";
pub const LAST_LOGIN_TIME_STORAGE_KEY: &str = "lastLoginTime";
pub const JUST_LOGGED_IN_STORAGE_KEY: &str = "justLoggedIn";

/// Persisted shape of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub user_info: Option<UserProfile>,
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default)]
    pub tokens: Option<Tokens>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl SessionSnapshot {
    fn is_empty(&self) -> bool {
        self.user_info.is_none()
            && !self.is_logged_in
            && self.tokens.is_none()
            && self.permissions.is_empty()
    }
}

/// Client auth session.
///
/// Owned by the composition root and shared by reference with the request
/// pipeline and the services. Every mutation is mirrored to storage under
/// [`SESSION_STORAGE_KEY`]. The in-memory lock is never held across an await.
pub struct Session {
    state: RwLock<SessionSnapshot>,
    store: SharedStore,
    /// Bumped every time `clear` drops auth state
    cleared: watch::Sender<u64>,
}

impl Session {
    pub fn new(store: SharedStore) -> Self {
        Self {
            state: RwLock::new(SessionSnapshot::default()),
            store,
            cleared: watch::channel(0).0,
        }
    }

    /// Sign-out epoch: changes whenever the session is cleared, so holders
    /// of per-user data know to drop it
    pub fn subscribe_cleared(&self) -> watch::Receiver<u64> {
        self.cleared.subscribe()
    }

    pub fn cleared_epoch(&self) -> u64 {
        *self.cleared.borrow()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Load the persisted session, if any. Returns whether a token was found.
    pub async fn restore(&self) -> ClientResult<bool> {
        let stored = match self.store.get(SESSION_STORAGE_KEY).await? {
            Some(value) => serde_json::from_value::<SessionSnapshot>(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                SessionSnapshot::default()
            }),
            None => SessionSnapshot::default(),
        };

        let has_token = stored.tokens.as_ref().is_some_and(Tokens::has_access_token);
        let mut state = self.state.write();
        if state.tokens.as_ref().is_some_and(Tokens::has_access_token) || !has_token {
            return Ok(has_token);
        }
        let mut restored = stored;
        if !restored.is_logged_in || restored.user_info.is_none() {
            // Token without a confirmed profile: keep the token only, the
            // profile is re-validated against the backend.
            restored.user_info = None;
            restored.is_logged_in = false;
        }
        restored.permissions = permissions_for(restored.user_info.as_ref());
        *state = restored;
        tracing::debug!(logged_in = state.is_logged_in, "Session restored from storage");
        Ok(true)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().clone()
    }

    pub fn tokens(&self) -> Option<Tokens> {
        self.state.read().tokens.clone()
    }

    /// Current access token, only when non-empty
    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .tokens
            .as_ref()
            .filter(|t| t.has_access_token())
            .map(|t| t.access_token.clone())
    }

    /// Current refresh token, only when non-empty
    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .read()
            .tokens
            .as_ref()
            .filter(|t| t.has_refresh_token())
            .map(|t| t.refresh_token.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().is_logged_in
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().user_info.clone()
    }

    pub fn permissions(&self) -> Vec<String> {
        self.state.read().permissions.clone()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.state.read().permissions.iter().any(|p| p == permission)
    }

    pub fn is_admin(&self) -> bool {
        self.state
            .read()
            .user_info
            .as_ref()
            .is_some_and(UserProfile::is_admin)
    }

    pub fn has_customer_permission(&self) -> bool {
        let state = self.state.read();
        state.is_logged_in
            && (state.permissions.iter().any(|p| p == PERMISSION_CUSTOMER_MANAGEMENT)
                || state.user_info.as_ref().is_some_and(UserProfile::is_admin))
    }

    pub fn user_type(&self) -> UserType {
        let state = self.state.read();
        UserType::resolve(state.is_logged_in, state.user_info.as_ref())
    }

    /// Replace the stored credentials wholesale
    pub async fn replace_tokens(&self, tokens: Tokens) -> ClientResult<()> {
        self.state.write().tokens = Some(tokens);
        self.persist().await
    }

    /// Apply tokens returned by a refresh. The backend may rotate only the
    /// access token, in which case the previous refresh token is kept.
    pub async fn apply_refreshed_tokens(&self, mut tokens: Tokens) -> ClientResult<()> {
        {
            let mut state = self.state.write();
            if !tokens.has_refresh_token() {
                if let Some(previous) = state.tokens.as_ref() {
                    tokens.refresh_token = previous.refresh_token.clone();
                    if tokens.refresh_expires_in == 0 {
                        tokens.refresh_expires_in = previous.refresh_expires_in;
                    }
                }
            }
            state.tokens = Some(tokens);
        }
        self.persist().await
    }

    /// Mark the session signed in with `profile` and derive permissions
    pub async fn set_user(&self, profile: UserProfile) -> ClientResult<()> {
        {
            let mut state = self.state.write();
            state.permissions = permissions_for(Some(&profile));
            state.user_info = Some(profile);
            state.is_logged_in = true;
        }
        self.persist().await
    }

    /// Merge fields into the current profile, re-deriving permissions when
    /// the status changed
    pub async fn update_user(&self, update: UserProfile) -> ClientResult<()> {
        {
            let mut state = self.state.write();
            let status_changed = update.status.is_some();
            let mut profile = state.user_info.take().unwrap_or_default();
            profile.merge(update);
            if status_changed {
                state.permissions = permissions_for(Some(&profile));
            }
            state.user_info = Some(profile);
        }
        self.persist().await
    }

    /// Drop all auth state. Idempotent: returns `true` only for the call that
    /// actually cleared something.
    pub async fn clear(&self) -> ClientResult<bool> {
        let cleared = {
            let mut state = self.state.write();
            if state.is_empty() {
                false
            } else {
                *state = SessionSnapshot::default();
                true
            }
        };

        if cleared {
            self.cleared.send_modify(|epoch| *epoch += 1);
            self.persist().await?;
            for key in [
                SESSION_KEY_STORAGE_KEY,
                LAST_LOGIN_TIME_STORAGE_KEY,
                JUST_LOGGED_IN_STORAGE_KEY,
            ] {
                self.store.remove(key).await?;
            }
            tracing::info!("Session cleared");
        }

        Ok(cleared)
    }

    async fn persist(&self) -> ClientResult<()> {
        let snapshot = self.snapshot();
        self.store
            .set(SESSION_STORAGE_KEY, serde_json::to_value(&snapshot)?)
            .await
    }

    pub async fn set_marker(&self, key: &str, value: Value) -> ClientResult<()> {
        self.store.set(key, value).await
    }

    pub async fn take_marker(&self, key: &str) -> ClientResult<Option<Value>> {
        let value = self.store.get(key).await?;
        if value.is_some() {
            self.store.remove(key).await?;
        }
        Ok(value)
    }
}
