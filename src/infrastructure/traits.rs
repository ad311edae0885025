use crate::error::AppResult;
use crate::models::Item;
use async_trait::async_trait;

/// Read side of the collection store, as seen by the page resolver
#[async_trait]
pub trait ItemReader: Send + Sync {
    /// Full item sequence; missing or unreadable storage reads as empty.
    async fn get_all(&self, collection: &str) -> Vec<Item>;
    async fn get_by_id(&self, collection: &str, id: &str) -> Option<Item>;
}

/// Named template resources referenced by a page's `template` field
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// `Ok(None)` when no resource with that name exists.
    async fn load(&self, name: &str) -> AppResult<Option<String>>;
}
