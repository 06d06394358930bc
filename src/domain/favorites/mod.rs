pub mod error;
pub mod model;
pub mod service;

pub use error::FavoritesError;
pub use model::{FavoriteItem, HistoryItem, HistoryStats, HistoryView};
pub use service::FavoritesService;
