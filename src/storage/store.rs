//! The object store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Keys requested per list page.
pub const PAGE_SIZE: usize = 500;

/// Error returned by object store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Any failure reported by the backing service.
    #[error("{0}")]
    Backend(String),
}

/// Result alias for store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
    /// Only filled by `head`; list results leave it empty.
    pub content_type: Option<String>,
}

/// One list call.
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub prefix: String,
    pub delimiter: Option<String>,
    pub continuation_token: Option<String>,
    pub max_keys: usize,
}

impl ListRequest {
    /// Recursive listing of everything under `prefix`.
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            continuation_token: None,
            max_keys: PAGE_SIZE,
        }
    }

    /// One folder level under `prefix`, split on `/`.
    pub fn folder(prefix: impl Into<String>, continuation_token: Option<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some("/".to_string()),
            continuation_token,
            max_keys: PAGE_SIZE,
        }
    }

    /// Continue from a previous page.
    pub fn after(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// One page of list results.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectMeta>,
    pub common_prefixes: Vec<String>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Object content returned by `get`.
#[derive(Debug, Clone)]
pub struct ObjectBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// A flat key/value object store with S3 list semantics.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys.
    async fn list(&self, request: ListRequest) -> StoreResult<ListPage>;

    /// Object metadata, or `None` when the key does not exist.
    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>>;

    /// Object content. Fails with [`StoreError::NotFound`] for unknown keys.
    async fn get(&self, key: &str) -> StoreResult<ObjectBody>;

    /// Server-side copy, replacing `target` if present.
    async fn copy(&self, source: &str, target: &str) -> StoreResult<()>;

    /// Delete a key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Delete several keys at once and return the keys reported deleted.
    async fn delete_many(&self, keys: &[String]) -> StoreResult<Vec<String>>;
}

/// Collect every object under `prefix`, following continuation tokens.
pub async fn list_all(store: &dyn ObjectStore, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
    let mut objects = Vec::new();
    let mut token = None;
    loop {
        let page = store
            .list(ListRequest::recursive(prefix).after(token))
            .await?;
        objects.extend(page.objects);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    Ok(objects)
}
