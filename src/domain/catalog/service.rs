use super::error::CatalogServiceError;
use super::{Brand, CarouselItem, ProductQuery, SearchRequest};
use crate::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const CACHE_KEY_INIT: &str = "init";
const CACHE_KEY_BRANDS: &str = "brands";
const CACHE_KEY_CAROUSEL: &str = "carousel";
const CACHE_KEY_CATEGORIES: &str = "categories";

pub struct CatalogService {
    client: Arc<ApiClient>,
    cache: Option<Cache<String, Value>>,
}

impl CatalogService {
    /// `cache_ttl` of `None` disables caching of the reference data
    pub fn new(client: Arc<ApiClient>, cache_ttl: Option<Duration>) -> Self {
        let cache = cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });

        Self { client, cache }
    }

    async fn fetch(&self, cache_key: Option<&str>, request: ApiRequest) -> Result<Value, CatalogServiceError> {
        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            if let Some(hit) = cache.get(key).await {
                tracing::debug!(key, "Catalog cache hit");
                return Ok(hit);
            }
        }

        let payload = self.client.send(request).await?;

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key.to_string(), payload.clone()).await;
        }
        Ok(payload)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        cache_key: &str,
        request: ApiRequest,
    ) -> Result<Vec<T>, CatalogServiceError> {
        match self.fetch(Some(cache_key), request).await? {
            Value::Null => Ok(Vec::new()),
            payload => serde_json::from_value(payload)
                .map_err(|e| CatalogServiceError::Payload(format!("{}: {}", cache_key, e))),
        }
    }

    /// Drop cached reference data so the next read hits the backend
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

#[async_trait]
pub trait CatalogServiceApi: Send + Sync {
    /// Everything the home page needs in one call: pages, brands, filter
    /// options, shops. Sent without credentials.
    async fn init_data(&self) -> Result<Value, CatalogServiceError>;

    async fn app_config(&self) -> Result<Value, CatalogServiceError>;

    async fn carousel(&self) -> Result<Vec<CarouselItem>, CatalogServiceError>;

    async fn brands(&self) -> Result<Vec<Brand>, CatalogServiceError>;

    async fn products(&self, query: ProductQuery) -> Result<Value, CatalogServiceError>;

    async fn product_detail(&self, id: &str) -> Result<Value, CatalogServiceError>;

    async fn categories(&self) -> Result<Value, CatalogServiceError>;

    async fn search(&self, request: SearchRequest) -> Result<Value, CatalogServiceError>;
}

#[async_trait]
impl CatalogServiceApi for CatalogService {
    async fn init_data(&self) -> Result<Value, CatalogServiceError> {
        self.fetch(Some(CACHE_KEY_INIT), ApiRequest::get("/init").public())
            .await
    }

    async fn app_config(&self) -> Result<Value, CatalogServiceError> {
        self.fetch(None, ApiRequest::get("/config")).await
    }

    async fn carousel(&self) -> Result<Vec<CarouselItem>, CatalogServiceError> {
        let items: Vec<CarouselItem> = self
            .fetch_list(CACHE_KEY_CAROUSEL, ApiRequest::get("/carousel"))
            .await?;
        Ok(items.into_iter().map(CarouselItem::with_resolved_image).collect())
    }

    async fn brands(&self) -> Result<Vec<Brand>, CatalogServiceError> {
        self.fetch_list(CACHE_KEY_BRANDS, ApiRequest::get("/brands"))
            .await
    }

    async fn products(&self, query: ProductQuery) -> Result<Value, CatalogServiceError> {
        let request = ApiRequest::get("/products").params(&query)?;
        self.fetch(None, request).await
    }

    async fn product_detail(&self, id: &str) -> Result<Value, CatalogServiceError> {
        if id.trim().is_empty() {
            return Err(CatalogServiceError::Invalid("product id is empty".to_string()));
        }
        let path = format!("/products/{}", urlencoding::encode(id));
        self.fetch(None, ApiRequest::get(path).with_loading(true))
            .await
    }

    async fn categories(&self) -> Result<Value, CatalogServiceError> {
        self.fetch(Some(CACHE_KEY_CATEGORIES), ApiRequest::get("/categories"))
            .await
    }

    async fn search(&self, request: SearchRequest) -> Result<Value, CatalogServiceError> {
        if request.keyword.trim().is_empty() {
            return Err(CatalogServiceError::Invalid("search keyword is empty".to_string()));
        }
        let api_request = ApiRequest::post("/search").json(&request)?;
        self.fetch(None, api_request).await
    }
}

/// Brands bucketed by the upper-cased first letter of `name_en`
pub fn group_brands_by_letter(brands: &[Brand]) -> BTreeMap<String, Vec<Brand>> {
    let mut grouped: BTreeMap<String, Vec<Brand>> = BTreeMap::new();
    for brand in brands {
        let letter = brand
            .name_en
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default();
        grouped.entry(letter).or_default().push(brand.clone());
    }
    grouped
}

/// Case-insensitive match on `name_en`, substring match on `name_cn`
pub fn search_brands(brands: &[Brand], keyword: &str) -> Vec<Brand> {
    if keyword.is_empty() {
        return brands.to_vec();
    }
    let needle = keyword.to_lowercase();
    brands
        .iter()
        .filter(|b| b.name_en.to_lowercase().contains(&needle) || b.name_cn.contains(keyword))
        .cloned()
        .collect()
}

pub fn find_brand<'a>(brands: &'a [Brand], id: &Value) -> Option<&'a Brand> {
    brands.iter().find(|b| &b.id == id)
}
