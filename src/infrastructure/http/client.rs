use super::envelope::{http_error, normalize};
use super::refresh::{RefreshCoordinator, RefreshTicket};
use super::request::ApiRequest;
use super::transport::{PreparedRequest, RawResponse, Transport};
use crate::domain::auth::{RefreshResponse, RefreshTokenRequest, Session};
use crate::error::{ClientError, ClientResult};
use crate::infrastructure::auth::outgoing_headers;
use crate::infrastructure::config::Config;
use crate::infrastructure::ui::{LoadingGuard, UiHooks};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const REFRESH_PATH: &str = "/refresh";
const UNAUTHORIZED: u16 = 401;

/// Authenticated request pipeline.
///
/// interceptor → transport → envelope normalizer, with the refresh
/// coordinator taking over when an auth-required call comes back 401.
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    ui: Arc<dyn UiHooks>,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        session: Arc<Session>,
        ui: Arc<dyn UiHooks>,
    ) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            timeout: config.request_timeout(),
            transport,
            session,
            ui,
            refresh: RefreshCoordinator::new(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn ui(&self) -> &Arc<dyn UiHooks> {
        &self.ui
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Run a call and resolve to its unwrapped payload
    pub async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let _loading = request
            .show_loading
            .then(|| LoadingGuard::show(self.ui.clone()));

        let result = self.execute(&request).await;

        if let Err(e) = &result {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "Request failed"
            );
            if request.show_error {
                self.ui.show_error(&e.user_message());
            }
        }

        result
    }

    /// Run a call and decode its payload into `T`
    pub async fn send_as<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let payload = self.send(request).await?;
        serde_json::from_value(payload).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn execute(&self, request: &ApiRequest) -> ClientResult<Value> {
        let generation = self.refresh.generation();
        let response = self
            .dispatch(request, self.session.access_token().as_deref())
            .await?;

        if response.status != UNAUTHORIZED || !request.need_auth {
            return Self::finish(response);
        }

        tracing::info!(path = %request.path, generation, "Access token rejected, refreshing");
        let token = self.fresh_access_token(generation).await?;

        // Replay once; a second 401 is final
        let replay = self.dispatch(request, Some(&token)).await?;
        Self::finish(replay)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> ClientResult<RawResponse> {
        let (request_id, headers) =
            outgoing_headers(&request.headers, request.need_auth, access_token);
        let prepared = PreparedRequest {
            method: request.method.clone(),
            url: request.url(&self.base_url),
            headers,
            body: request.body.clone(),
            timeout: self.timeout,
        };

        tracing::debug!(
            request_id = %request_id,
            method = %prepared.method,
            url = %prepared.url,
            "Sending request"
        );

        let response = self.transport.send(prepared).await?;

        tracing::debug!(
            request_id = %request_id,
            status = response.status,
            "Response received"
        );

        Ok(response)
    }

    fn finish(response: RawResponse) -> ClientResult<Value> {
        if response.is_success() {
            normalize(&response.body)
        } else {
            Err(http_error(response.status, &response.body))
        }
    }

    /// Token to replay with after a 401 on a request sent at `generation`
    async fn fresh_access_token(&self, generation: u64) -> ClientResult<String> {
        match self.refresh.join(generation) {
            RefreshTicket::AlreadyRefreshed => self.session.access_token().ok_or_else(|| {
                ClientError::RefreshFailed("no access token after refresh".to_string())
            }),
            RefreshTicket::Waiter(rx) => rx
                .await
                .map_err(|_| ClientError::RefreshFailed("refresh abandoned".to_string()))?,
            RefreshTicket::Leader(guard) => {
                let outcome = self.run_refresh().await;
                if let Err(e) = &outcome {
                    self.on_refresh_failure(e).await;
                }
                let woken = guard.complete(outcome.clone());
                tracing::debug!(woken, succeeded = outcome.is_ok(), "Refresh queue drained");
                outcome
            }
        }
    }

    async fn run_refresh(&self) -> ClientResult<String> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::RefreshFailed("no refresh token".to_string()))?;

        let request = ApiRequest::post(REFRESH_PATH)
            .public()
            .silent()
            .json(&RefreshTokenRequest { refresh_token })?;

        let payload = self
            .dispatch(&request, None)
            .await
            .and_then(Self::finish)
            .map_err(|e| ClientError::RefreshFailed(e.to_string()))?;

        let refreshed: RefreshResponse = serde_json::from_value(payload)
            .map_err(|e| ClientError::RefreshFailed(format!("unexpected refresh payload: {}", e)))?;

        if !refreshed.tokens.has_access_token() {
            return Err(ClientError::RefreshFailed(
                "refresh returned no access token".to_string(),
            ));
        }

        let access_token = refreshed.tokens.access_token.clone();
        if let Err(e) = self.session.apply_refreshed_tokens(refreshed.tokens).await {
            tracing::warn!(error = %e, "Refreshed tokens could not be persisted");
        }

        tracing::info!("Access token refreshed");
        Ok(access_token)
    }

    async fn on_refresh_failure(&self, error: &ClientError) {
        tracing::warn!(error = %error, "Token refresh failed, signing out");
        // Runs once per failed leader; waiters share the leader's outcome
        if let Err(e) = self.session.clear().await {
            tracing::error!(error = %e, "Failed to clear session");
        }
        self.ui.redirect_to_login();
    }
}
