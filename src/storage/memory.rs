//! In-process object store.
//!
//! Used by `backend = "memory"` buckets and by tests. Contents live only as
//! long as the process.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{
    ListPage, ListRequest, ObjectBody, ObjectMeta, ObjectStore, StoreError, StoreResult,
};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

/// Ordered in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, replacing any existing one.
    pub async fn put(&self, key: &str, bytes: impl Into<Vec<u8>>, content_type: Option<&str>) {
        let object = StoredObject {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
            last_modified: Utc::now(),
        };
        self.objects.write().await.insert(key.to_string(), object);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Whether `key` exists.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

fn meta(key: &str, object: &StoredObject, with_content_type: bool) -> ObjectMeta {
    ObjectMeta {
        key: key.to_string(),
        size: object.bytes.len() as u64,
        last_modified: Some(object.last_modified),
        content_type: if with_content_type {
            object.content_type.clone()
        } else {
            None
        },
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, request: ListRequest) -> StoreResult<ListPage> {
        let objects = self.objects.read().await;
        let max_keys = request.max_keys.max(1);

        let start = match &request.continuation_token {
            Some(token) if token.as_str() >= request.prefix.as_str() => {
                Bound::Excluded(token.clone())
            }
            _ => Bound::Included(request.prefix.clone()),
        };

        // A token that ended the previous page on a common prefix: everything
        // rolled up into it was already reported.
        let resumed_prefix = request
            .delimiter
            .as_deref()
            .zip(request.continuation_token.as_deref())
            .filter(|(delimiter, token)| {
                token.ends_with(delimiter) && token.len() > request.prefix.len()
            })
            .map(|(_, token)| token);

        let mut page = ListPage::default();
        let mut emitted = 0usize;
        let mut last_emitted: Option<String> = None;

        for (key, object) in objects.range((start, Bound::Unbounded)) {
            let Some(rest) = key.strip_prefix(request.prefix.as_str()) else {
                break;
            };

            if resumed_prefix.is_some_and(|prefix| key.starts_with(prefix)) {
                continue;
            }

            let common_prefix = request.delimiter.as_deref().and_then(|delimiter| {
                rest.find(delimiter)
                    .map(|idx| format!("{}{}", request.prefix, &rest[..idx + delimiter.len()]))
            });

            if let (Some(prefix), Some(last)) = (&common_prefix, &last_emitted) {
                if prefix == last {
                    continue;
                }
            }

            if emitted == max_keys {
                page.next_token = last_emitted;
                return Ok(page);
            }

            match common_prefix {
                Some(prefix) => {
                    page.common_prefixes.push(prefix.clone());
                    last_emitted = Some(prefix);
                }
                None => {
                    page.objects.push(meta(key, object, false));
                    last_emitted = Some(key.clone());
                }
            }
            emitted += 1;
        }

        Ok(page)
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>> {
        let objects = self.objects.read().await;
        Ok(objects.get(key).map(|object| meta(key, object, true)))
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|object| ObjectBody {
                bytes: object.bytes.clone(),
                content_type: object.content_type.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn copy(&self, source: &str, target: &str) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        let mut object = objects
            .get(source)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(source.to_string()))?;
        object.last_modified = Utc::now();
        objects.insert(target.to_string(), object);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<Vec<String>> {
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(keys.to_vec())
    }
}
