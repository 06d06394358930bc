use super::error::FavoritesError;
use super::model::{
    product_id, FavoriteItem, HistoryItem, HistoryStats, HistoryView, FAVORITES_STORAGE_KEY,
    HISTORY_LIMIT, HISTORY_STORAGE_KEY,
};
use crate::error::ClientError;
use crate::infrastructure::storage::SharedStore;
use crate::infrastructure::ui::UiHooks;
use chrono::{DateTime, Duration, Local, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

const ADDED_MESSAGE: &str = "Added to favorites";
const REMOVED_MESSAGE: &str = "Removed from favorites";
const CLEARED_MESSAGE: &str = "Favorites cleared";

/// Favorites and recently viewed products, kept on the device
pub struct FavoritesService {
    store: SharedStore,
    ui: Arc<dyn UiHooks>,
    favorites: Mutex<Vec<FavoriteItem>>,
    history: Mutex<Vec<HistoryItem>>,
}

impl FavoritesService {
    pub fn new(store: SharedStore, ui: Arc<dyn UiHooks>) -> Self {
        Self {
            store,
            ui,
            favorites: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Load both lists from storage. Unreadable entries start empty.
    pub async fn init(&self) -> Result<(), FavoritesError> {
        let favorites = self.load_list::<FavoriteItem>(FAVORITES_STORAGE_KEY).await?;
        let history = self.load_list::<HistoryItem>(HISTORY_STORAGE_KEY).await?;
        tracing::debug!(
            favorites = favorites.len(),
            history = history.len(),
            "Favorites restored"
        );
        *self.favorites.lock() = favorites;
        *self.history.lock() = history;
        Ok(())
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, FavoritesError> {
        let Some(stored) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_value(stored) {
            Ok(list) => Ok(list),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable stored list");
                Ok(Vec::new())
            }
        }
    }

    async fn save_favorites(&self) -> Result<(), FavoritesError> {
        let snapshot = serde_json::to_value(&*self.favorites.lock()).map_err(ClientError::from)?;
        self.store.set(FAVORITES_STORAGE_KEY, snapshot).await?;
        Ok(())
    }

    async fn save_history(&self) -> Result<(), FavoritesError> {
        let snapshot = serde_json::to_value(&*self.history.lock()).map_err(ClientError::from)?;
        self.store.set(HISTORY_STORAGE_KEY, snapshot).await?;
        Ok(())
    }

    pub fn favorites(&self) -> Vec<FavoriteItem> {
        self.favorites.lock().clone()
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.lock().len()
    }

    pub fn is_favorited(&self, id: &Value) -> bool {
        self.favorites.lock().iter().any(|item| &item.id == id)
    }

    /// Returns false when the product is already a favorite
    pub async fn add_favorite(&self, product: &Value) -> Result<bool, FavoritesError> {
        let item = FavoriteItem::from_product(product, Utc::now())
            .ok_or_else(|| FavoritesError::InvalidProduct("product has no id".to_string()))?;

        {
            let mut favorites = self.favorites.lock();
            if favorites.iter().any(|f| f.id == item.id) {
                return Ok(false);
            }
            favorites.insert(0, item);
        }

        self.save_favorites().await?;
        self.ui.show_success(ADDED_MESSAGE);
        Ok(true)
    }

    pub async fn remove_favorite(&self, id: &Value) -> Result<bool, FavoritesError> {
        let removed = {
            let mut favorites = self.favorites.lock();
            let before = favorites.len();
            favorites.retain(|f| &f.id != id);
            favorites.len() != before
        };

        if removed {
            self.save_favorites().await?;
            self.ui.show_success(REMOVED_MESSAGE);
        }
        Ok(removed)
    }

    /// Add when absent, remove when present; returns whether anything changed
    pub async fn toggle_favorite(&self, product: &Value) -> Result<bool, FavoritesError> {
        let id = product_id(product)
            .ok_or_else(|| FavoritesError::InvalidProduct("product has no id".to_string()))?;
        if self.is_favorited(&id) {
            self.remove_favorite(&id).await
        } else {
            self.add_favorite(product).await
        }
    }

    pub async fn clear_favorites(&self) -> Result<(), FavoritesError> {
        self.favorites.lock().clear();
        self.save_favorites().await?;
        self.ui.show_success(CLEARED_MESSAGE);
        Ok(())
    }

    /// Record a product view: newest first, one entry per product, capped
    pub async fn record_view(&self, product: &Value) -> Result<(), FavoritesError> {
        let item = HistoryItem::from_product(product, Utc::now())
            .ok_or_else(|| FavoritesError::InvalidProduct("product has no id".to_string()))?;

        {
            let mut history = self.history.lock();
            history.retain(|h| h.id != item.id);
            history.insert(0, item);
            history.truncate(HISTORY_LIMIT);
        }

        self.save_history().await
    }

    pub async fn clear_history(&self) -> Result<(), FavoritesError> {
        self.history.lock().clear();
        self.save_history().await
    }

    pub fn history_count(&self) -> usize {
        self.history.lock().len()
    }

    pub fn recently_viewed(&self, limit: usize) -> Vec<HistoryItem> {
        self.history.lock().iter().take(limit).cloned().collect()
    }

    pub fn recently_viewed_formatted(&self, limit: usize) -> Vec<HistoryView> {
        let now = Utc::now();
        self.recently_viewed(limit)
            .into_iter()
            .map(|item| HistoryView::at(item, now))
            .collect()
    }

    pub fn find_in_history(&self, id: &Value) -> Option<HistoryItem> {
        self.history.lock().iter().find(|h| &h.id == id).cloned()
    }

    pub fn history_stats(&self) -> HistoryStats {
        self.history_stats_at(Local::now())
    }

    /// Counts views since local midnight and during the previous local day
    pub fn history_stats_at(&self, now: DateTime<Local>) -> HistoryStats {
        let history = self.history.lock();

        let today = now.date_naive();
        let yesterday = today - Duration::days(1);
        let day_of = |item: &HistoryItem| item.viewed_at.with_timezone(&Local).date_naive();

        HistoryStats {
            total: history.len(),
            today_count: history.iter().filter(|h| day_of(*h) >= today).count(),
            yesterday_count: history.iter().filter(|h| day_of(*h) == yesterday).count(),
            latest_view_time: history.first().map(|h| h.viewed_at),
        }
    }
}
