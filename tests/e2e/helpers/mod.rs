use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use watchshop_client::domain::auth::{Session, Tokens};
use watchshop_client::domain::user::UserProfile;
use watchshop_client::infrastructure::config::Config;
use watchshop_client::infrastructure::http::{ApiClient, ReqwestTransport};
use watchshop_client::infrastructure::storage::MemoryStore;
use watchshop_client::infrastructure::ui::RecordingUi;

pub mod mock_backend;

use mock_backend::MockBackend;

pub struct TestContext {
    pub backend: Arc<MockBackend>,
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub session: Arc<Session>,
    pub ui: Arc<RecordingUi>,
    pub client: Arc<ApiClient>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let backend = Arc::new(MockBackend::new());
            let app = mock_backend::router(backend.clone());

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let config = Config::for_base_url(&format!("http://{}/api/mini", addr));
            let store = Arc::new(MemoryStore::new());
            let session = Arc::new(Session::new(store.clone()));
            let ui = Arc::new(RecordingUi::new());
            let client = Arc::new(ApiClient::new(
                &config,
                Arc::new(ReqwestTransport::new()),
                session.clone(),
                ui.clone(),
            ));

            Self {
                backend,
                config,
                store,
                session,
                ui,
                client,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Server task ends with the runtime
        }
    }
}

impl TestContext {
    /// Signed-in admin session holding `access`/`refresh`
    pub async fn sign_in_with(&self, access: &str, refresh: &str) {
        self.session
            .replace_tokens(Tokens::new(access, refresh))
            .await
            .expect("Failed to store tokens");
        let profile: UserProfile =
            serde_json::from_value(serde_json::json!({"id": 1, "nickname": "Ada", "status": 1}))
                .expect("Failed to build profile");
        self.session
            .set_user(profile)
            .await
            .expect("Failed to store profile");
    }
}
