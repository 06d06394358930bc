use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Home page carousel slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarouselItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CarouselItem {
    /// `carousel_image`, when present, is the image to display
    pub fn with_resolved_image(mut self) -> Self {
        if self.carousel_image.is_some() {
            self.image = self.carousel_image.clone();
        }
        self
    }
}

/// Filters for `GET /products`; unset fields are left out of the query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Body of `POST /search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
}
