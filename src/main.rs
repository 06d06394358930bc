use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchshop_client::domain::auth::{AuthService, AuthServiceApi, Session};
use watchshop_client::domain::catalog::{group_brands_by_letter, CatalogService, CatalogServiceApi};
use watchshop_client::domain::favorites::FavoritesService;
use watchshop_client::infrastructure::config::{Config, LogFormat};
use watchshop_client::infrastructure::http::{ApiClient, ReqwestTransport};
use watchshop_client::infrastructure::storage::{JsonFileStore, SharedStore};
use watchshop_client::infrastructure::ui::{TracingUi, UiHooks};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        base_url = %config.api_base_url,
        storage = %config.storage_path.display(),
        "Starting watch shop client"
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Local storage and session state
    let store: SharedStore = Arc::new(JsonFileStore::new(config.storage_path.clone()));
    let session = Arc::new(Session::new(store.clone()));
    let ui: Arc<dyn UiHooks> = Arc::new(TracingUi);

    // 2. HTTP pipeline
    let transport = Arc::new(ReqwestTransport::new());
    let client = Arc::new(ApiClient::new(&config, transport, session.clone(), ui.clone()));

    // 3. Services
    let auth_service = AuthService::new(client.clone());
    let catalog_service = CatalogService::new(client.clone(), config.catalog_cache_ttl());
    let favorites_service = FavoritesService::new(store, ui);

    favorites_service.init().await?;

    let signed_in = auth_service.init_user_state().await?;
    tracing::info!(signed_in, user_type = %session.user_type(), "Session restored");

    let init = catalog_service.init_data().await?;
    let brands = catalog_service.brands().await?;
    let grouped = group_brands_by_letter(&brands);

    tracing::info!(
        init_sections = init.as_object().map(|o| o.len()).unwrap_or(0),
        brands = brands.len(),
        brand_letters = grouped.len(),
        favorites = favorites_service.favorites_count(),
        recently_viewed = favorites_service.history_count(),
        "Client ready"
    );

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "watchshop_client=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "watchshop_client=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
