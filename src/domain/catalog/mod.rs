pub mod dto;
pub mod error;
pub mod service;

pub use dto::{Brand, CarouselItem, ProductQuery, SearchRequest};
pub use error::CatalogServiceError;
pub use service::{find_brand, group_brands_by_letter, search_brands, CatalogService, CatalogServiceApi};
