pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::ClientResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Local device storage: a flat map of string keys to JSON documents.
///
/// The client only reads and writes through this trait and never assumes a
/// medium. Missing keys read as `None`; removing a missing key is a no-op.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> ClientResult<()>;

    async fn remove(&self, key: &str) -> ClientResult<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;
