use crate::domain::shared::{format_price, relative_time_at};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FAVORITES_STORAGE_KEY: &str = "favorites";
pub const HISTORY_STORAGE_KEY: &str = "browsing_history";
pub const HISTORY_LIMIT: usize = 5;
pub const PLACEHOLDER_IMAGE: &str = "/static/logo.png";
const UNKNOWN_PRODUCT: &str = "unknown product";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: Value,
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

/// History entry with its display strings resolved
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub item: HistoryItem,
    pub formatted_time: String,
    pub formatted_price: String,
    pub display_image: String,
}

impl HistoryView {
    pub fn at(item: HistoryItem, now: DateTime<Utc>) -> Self {
        let price = if item.price == 0.0 { None } else { Some(item.price) };
        Self {
            formatted_time: relative_time_at(item.viewed_at, now),
            formatted_price: format_price(price),
            display_image: item
                .image
                .clone()
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryStats {
    pub total: usize,
    pub today_count: usize,
    pub yesterday_count: usize,
    pub latest_view_time: Option<DateTime<Utc>>,
}

impl HistoryStats {
    pub fn has_history(&self) -> bool {
        self.total > 0
    }
}

/// Product id, rejecting missing, null, empty and zero ids
pub fn product_id(product: &Value) -> Option<Value> {
    match product.get("id")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        id => Some(id.clone()),
    }
}

fn text(product: &Value, key: &str) -> Option<String> {
    product
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numeric price, accepting numbers and numeric strings
pub fn product_price(product: &Value) -> Option<f64> {
    match product.get("price")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn first_image(product: &Value) -> String {
    product
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(|first| text(first, "image_url").or_else(|| text(first, "url")))
        .unwrap_or_default()
}

impl FavoriteItem {
    pub fn from_product(product: &Value, added_at: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            id: product_id(product)?,
            title: text(product, "title").or_else(|| text(product, "name")),
            model: text(product, "model"),
            price: product_price(product),
            image: first_image(product),
            added_at,
        })
    }
}

impl HistoryItem {
    pub fn from_product(product: &Value, viewed_at: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            id: product_id(product)?,
            title: text(product, "title")
                .or_else(|| text(product, "name"))
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
            price: product_price(product).unwrap_or(0.0),
            image: Some(first_image(product)).filter(|i| !i.is_empty()),
            viewed_at,
        })
    }
}
