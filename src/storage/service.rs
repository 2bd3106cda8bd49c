//! Storage operations exposed by the API.

use std::collections::HashSet;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tracing::{info, warn};

use super::registry::{BucketEntry, BucketRegistry};
use super::store::{list_all, ListRequest, ObjectMeta, ObjectStore, StoreError};
use super::types::{
    Bucket, BulkCopyMoveRequest, BulkOperationResult, CopyMoveRequest, DeleteObjectsRequest,
    Download, FolderCopyRequest, FolderItem, FolderOperationResult, FolderSizeResponse,
    ObjectItem, ObjectListResponse,
};
use crate::keys::{
    extract_name, folder_name_from_prefix, is_directory_marker, normalize_prefix,
    WildcardPattern,
};
use crate::{NavError, Result};

/// Content type used when the store has none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Keys per batch delete call.
const DELETE_BATCH_SIZE: usize = 900;

/// Concurrent head requests while building listings.
const HEAD_CONCURRENCY: usize = 8;

fn store_error(err: StoreError) -> NavError {
    match err {
        StoreError::NotFound(key) => NavError::NotFound(format!("Object '{key}'")),
        other => NavError::Storage(other),
    }
}

/// Storage service over the configured buckets.
#[derive(Clone)]
pub struct StorageService {
    registry: Arc<BucketRegistry>,
}

impl StorageService {
    pub fn new(registry: Arc<BucketRegistry>) -> Self {
        Self { registry }
    }

    /// The bucket registry.
    pub fn registry(&self) -> &Arc<BucketRegistry> {
        &self.registry
    }

    fn entry(&self, bucket_id: &str) -> Result<&BucketEntry> {
        self.registry.require(bucket_id)
    }

    /// All configured buckets.
    pub fn list_buckets(&self) -> Vec<Bucket> {
        self.registry.list()
    }

    /// One folder level, at most 500 entries per page.
    pub async fn list_objects(
        &self,
        bucket_id: &str,
        prefix: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ObjectListResponse> {
        let store = &self.entry(bucket_id)?.store;
        let prefix = normalize_prefix(prefix);
        let token = page_token
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);

        let page = store
            .list(ListRequest::folder(prefix.as_str(), token))
            .await
            .map_err(store_error)?;

        let folders = page
            .common_prefixes
            .iter()
            .map(|cp| FolderItem {
                name: folder_name_from_prefix(&prefix, cp),
                prefix: cp.clone(),
            })
            .collect();

        let files = page
            .objects
            .into_iter()
            .filter(|o| !is_directory_marker(&o.key))
            .collect();
        let objects = object_items(store.as_ref(), files).await?;

        Ok(ObjectListResponse {
            current_prefix: prefix,
            folders,
            objects,
            next_page_token: page.next_token,
        })
    }

    /// Every object under `prefix` whose relative key or name matches `query`.
    pub async fn search(
        &self,
        bucket_id: &str,
        prefix: Option<&str>,
        query: &str,
    ) -> Result<ObjectListResponse> {
        let store = &self.entry(bucket_id)?.store;
        let prefix = normalize_prefix(prefix);
        let pattern = WildcardPattern::new(query);

        let matches = list_all(store.as_ref(), &prefix)
            .await
            .map_err(store_error)?
            .into_iter()
            .filter(|o| !is_directory_marker(&o.key))
            .filter(|o| {
                let relative = o.key.strip_prefix(prefix.as_str()).unwrap_or(&o.key);
                pattern.matches(relative) || pattern.matches(extract_name(relative))
            })
            .collect();

        let objects = object_items(store.as_ref(), matches).await?;
        Ok(ObjectListResponse {
            current_prefix: prefix,
            folders: Vec::new(),
            objects,
            next_page_token: None,
        })
    }

    /// Object content for download.
    pub async fn download(&self, bucket_id: &str, key: &str) -> Result<Download> {
        let store = &self.entry(bucket_id)?.store;
        let body = store.get(key).await.map_err(store_error)?;

        let content_type = body
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .or_else(|| mime_guess::from_path(key).first().map(|m| m.to_string()))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(Download {
            bytes: body.bytes,
            content_type,
            file_name: extract_name(key).to_string(),
        })
    }

    /// Copy one object. Fails with Conflict when the target exists and
    /// `overwrite` is off.
    pub async fn copy(&self, bucket_id: &str, request: &CopyMoveRequest) -> Result<ObjectItem> {
        let store = &self.entry(bucket_id)?.store;
        if request.source_key == request.target_key {
            return Err(NavError::Validation(
                "Source and target keys must differ".to_string(),
            ));
        }
        if !request.overwrite && exists(store.as_ref(), &request.target_key).await? {
            return Err(NavError::Conflict("Target already exists".to_string()));
        }

        store
            .copy(&request.source_key, &request.target_key)
            .await
            .map_err(store_error)?;
        info!(
            bucket = bucket_id,
            source = %request.source_key,
            target = %request.target_key,
            "Copied object"
        );

        let meta = store
            .head(&request.target_key)
            .await
            .map_err(store_error)?
            .ok_or_else(|| NavError::NotFound(format!("Object '{}'", request.target_key)))?;
        Ok(to_item(meta))
    }

    /// Copy then delete the source.
    pub async fn move_object(
        &self,
        bucket_id: &str,
        request: &CopyMoveRequest,
    ) -> Result<ObjectItem> {
        let item = self.copy(bucket_id, request).await?;
        let store = &self.entry(bucket_id)?.store;
        store
            .delete(&request.source_key)
            .await
            .map_err(store_error)?;
        info!(bucket = bucket_id, source = %request.source_key, "Deleted moved source");
        Ok(item)
    }

    /// Copy several objects; failures are reported per item.
    pub async fn bulk_copy(
        &self,
        bucket_id: &str,
        request: &BulkCopyMoveRequest,
    ) -> Result<Vec<BulkOperationResult>> {
        self.bulk(bucket_id, request, false).await
    }

    /// Move several objects; failures are reported per item.
    pub async fn bulk_move(
        &self,
        bucket_id: &str,
        request: &BulkCopyMoveRequest,
    ) -> Result<Vec<BulkOperationResult>> {
        self.bulk(bucket_id, request, true).await
    }

    async fn bulk(
        &self,
        bucket_id: &str,
        request: &BulkCopyMoveRequest,
        remove_source: bool,
    ) -> Result<Vec<BulkOperationResult>> {
        let store = &self.entry(bucket_id)?.store;
        let (done, failed) = if remove_source {
            ("moved", "Move failed")
        } else {
            ("copied", "Copy failed")
        };

        let mut results = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let outcome = async {
                if !request.overwrite && exists(store.as_ref(), &item.target_key).await? {
                    return Ok(false);
                }
                store
                    .copy(&item.source_key, &item.target_key)
                    .await
                    .map_err(store_error)?;
                if remove_source {
                    store.delete(&item.source_key).await.map_err(store_error)?;
                }
                Ok::<_, NavError>(true)
            }
            .await;

            let (success, message) = match outcome {
                Ok(true) => (true, done.to_string()),
                Ok(false) => (false, "Target exists".to_string()),
                Err(e) => {
                    warn!(bucket = bucket_id, source = %item.source_key, error = %e, "Bulk item failed");
                    (false, format!("{failed}: {e}"))
                }
            };
            results.push(BulkOperationResult {
                source_key: item.source_key.clone(),
                target_key: item.target_key.clone(),
                success,
                message,
            });
        }

        info!(
            bucket = bucket_id,
            items = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            operation = done,
            "Bulk operation finished"
        );
        Ok(results)
    }

    /// Copy every key under a prefix.
    pub async fn copy_folder(
        &self,
        bucket_id: &str,
        request: &FolderCopyRequest,
    ) -> Result<FolderOperationResult> {
        self.folder_operation(bucket_id, request, false).await
    }

    /// Move every key under a prefix.
    pub async fn move_folder(
        &self,
        bucket_id: &str,
        request: &FolderCopyRequest,
    ) -> Result<FolderOperationResult> {
        self.folder_operation(bucket_id, request, true).await
    }

    async fn folder_operation(
        &self,
        bucket_id: &str,
        request: &FolderCopyRequest,
        remove_source: bool,
    ) -> Result<FolderOperationResult> {
        let store = &self.entry(bucket_id)?.store;
        let source = normalize_prefix(Some(&request.source_prefix));
        let target = normalize_prefix(Some(&request.target_prefix));

        if source.is_empty() {
            return Err(NavError::Validation(
                "Source prefix must not be blank".to_string(),
            ));
        }
        if target.starts_with(&source) {
            return Err(NavError::Validation(
                "Target prefix must not be the source or inside it".to_string(),
            ));
        }

        let keys: Vec<String> = list_all(store.as_ref(), &source)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|o| o.key)
            .collect();

        let mut result = FolderOperationResult {
            source_prefix: source.clone(),
            target_prefix: target.clone(),
            total_objects: keys.len(),
            copied: 0,
            skipped: 0,
            errors: Vec::new(),
        };

        for key in keys.iter().filter(|k| !is_directory_marker(k)) {
            let relative = key.strip_prefix(source.as_str()).unwrap_or(key);
            let target_key = format!("{target}{relative}");

            let outcome = async {
                if !request.overwrite && exists(store.as_ref(), &target_key).await? {
                    return Ok(false);
                }
                store.copy(key, &target_key).await.map_err(store_error)?;
                if remove_source {
                    store.delete(key).await.map_err(store_error)?;
                }
                Ok::<_, NavError>(true)
            }
            .await;

            let message = match outcome {
                Ok(true) => {
                    result.copied += 1;
                    continue;
                }
                Ok(false) => {
                    result.skipped += 1;
                    "Target exists and overwrite=false".to_string()
                }
                Err(e) => {
                    warn!(bucket = bucket_id, source = %key, error = %e, "Folder item failed");
                    format!("Failed: {e}")
                }
            };
            result.errors.push(BulkOperationResult {
                source_key: key.clone(),
                target_key,
                success: false,
                message,
            });
        }

        info!(
            bucket = bucket_id,
            source = %source,
            target = %target,
            copied = result.copied,
            skipped = result.skipped,
            errors = result.errors.len(),
            moved = remove_source,
            "Folder operation finished"
        );
        Ok(result)
    }

    /// Delete keys and everything under the given prefixes. Returns the
    /// keys the store reported deleted.
    pub async fn delete_objects(
        &self,
        bucket_id: &str,
        request: &DeleteObjectsRequest,
    ) -> Result<Vec<String>> {
        if request.is_empty() {
            return Err(NavError::Validation(
                "No keys or prefixes provided".to_string(),
            ));
        }
        let store = &self.entry(bucket_id)?.store;

        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for key in &request.keys {
            if !key.trim().is_empty() && seen.insert(key.clone()) {
                keys.push(key.clone());
            }
        }
        for prefix in &request.prefixes {
            let prefix = normalize_prefix(Some(prefix));
            if prefix.is_empty() {
                return Err(NavError::Validation(
                    "Prefix must not be blank".to_string(),
                ));
            }
            for object in list_all(store.as_ref(), &prefix)
                .await
                .map_err(store_error)?
            {
                if seen.insert(object.key.clone()) {
                    keys.push(object.key);
                }
            }
        }

        let deleted = delete_in_batches(store.as_ref(), &keys).await?;
        info!(bucket = bucket_id, deleted = deleted.len(), "Deleted objects");
        Ok(deleted)
    }

    /// Delete every key under `prefix` and return how many there were.
    pub async fn delete_folder(&self, bucket_id: &str, prefix: &str) -> Result<usize> {
        let store = &self.entry(bucket_id)?.store;
        let prefix = normalize_prefix(Some(prefix));
        if prefix.is_empty() {
            return Err(NavError::Validation(
                "Prefix must not be blank".to_string(),
            ));
        }

        let keys: Vec<String> = list_all(store.as_ref(), &prefix)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|o| o.key)
            .collect();
        delete_in_batches(store.as_ref(), &keys).await?;

        info!(bucket = bucket_id, prefix = %prefix, deleted = keys.len(), "Deleted folder");
        Ok(keys.len())
    }

    /// Total size and object count under a prefix, computed inline.
    pub async fn folder_size(&self, bucket_id: &str, prefix: &str) -> Result<FolderSizeResponse> {
        let store = &self.entry(bucket_id)?.store;
        let prefix = normalize_prefix(Some(prefix));

        let (total, count) = list_all(store.as_ref(), &prefix)
            .await
            .map_err(store_error)?
            .iter()
            .filter(|o| !is_directory_marker(&o.key))
            .fold((0u64, 0u64), |(total, count), o| (total + o.size, count + 1));

        Ok(FolderSizeResponse {
            prefix,
            total_size_bytes: total,
            object_count: count,
        })
    }
}

async fn exists(store: &dyn ObjectStore, key: &str) -> Result<bool> {
    Ok(store.head(key).await.map_err(store_error)?.is_some())
}

async fn delete_in_batches(store: &dyn ObjectStore, keys: &[String]) -> Result<Vec<String>> {
    let mut deleted = Vec::with_capacity(keys.len());
    for chunk in keys.chunks(DELETE_BATCH_SIZE) {
        deleted.extend(store.delete_many(chunk).await.map_err(store_error)?);
    }
    Ok(deleted)
}

fn to_item(meta: ObjectMeta) -> ObjectItem {
    ObjectItem {
        name: extract_name(&meta.key).to_string(),
        content_type: meta
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        key: meta.key,
        size_bytes: meta.size,
        last_modified: meta.last_modified,
    }
}

/// Listing entries with their content types, fetched with bounded
/// concurrency.
async fn object_items(store: &dyn ObjectStore, objects: Vec<ObjectMeta>) -> Result<Vec<ObjectItem>> {
    futures::stream::iter(objects)
        .map(|listed| async move {
            let head = store.head(&listed.key).await.map_err(store_error)?;
            let content_type = head.and_then(|h| h.content_type);
            Ok::<_, NavError>(to_item(ObjectMeta {
                content_type,
                ..listed
            }))
        })
        .buffered(HEAD_CONCURRENCY)
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::types::BulkItem;

    async fn service_with(keys: &[(&str, &str)]) -> (StorageService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (key, data) in keys {
            store.put(key, *data, None).await;
        }
        let registry = BucketRegistry::new(vec![BucketEntry {
            bucket: Bucket {
                id: "test".to_string(),
                name: "Test".to_string(),
                bucket_name: "test-bucket".to_string(),
            },
            store: store.clone(),
        }])
        .unwrap();
        (StorageService::new(Arc::new(registry)), store)
    }

    #[tokio::test]
    async fn test_list_objects_by_prefix() {
        let (service, _) = service_with(&[
            ("root.txt", "r"),
            ("logs/", ""),
            ("logs/app/a.log", "aa"),
            ("logs/readme.md", "readme"),
        ])
        .await;

        let listing = service.list_objects("test", Some("logs"), None).await.unwrap();
        assert_eq!(listing.current_prefix, "logs/");
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].name, "app");
        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.objects[0].name, "readme.md");
        assert_eq!(listing.objects[0].content_type, DEFAULT_CONTENT_TYPE);
        assert!(listing.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_list_unknown_bucket() {
        let (service, _) = service_with(&[]).await;
        let result = service.list_objects("nope", None, None).await;
        assert!(matches!(result, Err(NavError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_wildcard() {
        let (service, _) = service_with(&[
            ("reports/trade_2025_jan.csv", "x"),
            ("reports/trade_2026_jan.csv", "x"),
            ("reports/archive/trade_2025_feb.csv", "x"),
        ])
        .await;

        let result = service
            .search("test", Some("reports/"), "trade_2025_*.csv")
            .await
            .unwrap();
        let keys: Vec<_> = result.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["reports/archive/trade_2025_feb.csv", "reports/trade_2025_jan.csv"]
        );
    }

    #[tokio::test]
    async fn test_copy_conflict_and_overwrite() {
        let (service, store) = service_with(&[("a.txt", "one"), ("b.txt", "two")]).await;
        let mut request = CopyMoveRequest {
            source_key: "a.txt".to_string(),
            target_key: "b.txt".to_string(),
            overwrite: false,
        };

        let result = service.copy("test", &request).await;
        assert!(matches!(result, Err(NavError::Conflict(_))));

        request.overwrite = true;
        let item = service.copy("test", &request).await.unwrap();
        assert_eq!(item.size_bytes, 3);
        assert!(store.contains("a.txt").await);
    }

    #[tokio::test]
    async fn test_move_removes_source() {
        let (service, store) = service_with(&[("a.txt", "one")]).await;
        let request = CopyMoveRequest {
            source_key: "a.txt".to_string(),
            target_key: "moved/a.txt".to_string(),
            overwrite: false,
        };

        let item = service.move_object("test", &request).await.unwrap();
        assert_eq!(item.key, "moved/a.txt");
        assert!(!store.contains("a.txt").await);
    }

    #[tokio::test]
    async fn test_download_missing_key() {
        let (service, _) = service_with(&[]).await;
        let result = service.download("test", "nope.txt").await;
        assert!(matches!(result, Err(NavError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_guesses_content_type() {
        let (service, _) = service_with(&[("docs/report.pdf", "%PDF")]).await;
        let download = service.download("test", "docs/report.pdf").await.unwrap();
        assert_eq!(download.file_name, "report.pdf");
        assert_eq!(download.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_bulk_copy_partial_failure() {
        let (service, _) = service_with(&[("a.txt", "a"), ("b.txt", "b"), ("taken.txt", "t")]).await;
        let request = BulkCopyMoveRequest {
            items: vec![
                BulkItem {
                    source_key: "a.txt".to_string(),
                    target_key: "copy/a.txt".to_string(),
                },
                BulkItem {
                    source_key: "b.txt".to_string(),
                    target_key: "taken.txt".to_string(),
                },
                BulkItem {
                    source_key: "missing.txt".to_string(),
                    target_key: "copy/missing.txt".to_string(),
                },
            ],
            overwrite: false,
        };

        let results = service.bulk_copy("test", &request).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert_eq!(results[0].message, "copied");
        assert!(!results[1].success);
        assert_eq!(results[1].message, "Target exists");
        assert!(!results[2].success);
        assert!(results[2].message.starts_with("Copy failed:"));
    }

    #[tokio::test]
    async fn test_bulk_move() {
        let (service, store) = service_with(&[("a.txt", "a")]).await;
        let request = BulkCopyMoveRequest {
            items: vec![BulkItem {
                source_key: "a.txt".to_string(),
                target_key: "b.txt".to_string(),
            }],
            overwrite: false,
        };

        let results = service.bulk_move("test", &request).await.unwrap();
        assert_eq!(results[0].message, "moved");
        assert!(!store.contains("a.txt").await);
        assert!(store.contains("b.txt").await);
    }

    #[tokio::test]
    async fn test_copy_folder_skips_existing() {
        let (service, _) = service_with(&[
            ("src/a.txt", "a"),
            ("src/sub/b.txt", "b"),
            ("dst/a.txt", "old"),
        ])
        .await;
        let request = FolderCopyRequest {
            source_prefix: "src".to_string(),
            target_prefix: "dst".to_string(),
            overwrite: false,
        };

        let result = service.copy_folder("test", &request).await.unwrap();
        assert_eq!(result.total_objects, 2);
        assert_eq!(result.copied, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].source_key, "src/a.txt");
        assert_eq!(result.errors[0].target_key, "dst/a.txt");
        assert!(!result.errors[0].success);
        assert_eq!(result.errors[0].message, "Target exists and overwrite=false");
    }

    #[tokio::test]
    async fn test_folder_operations_skip_directory_markers() {
        let (service, store) =
            service_with(&[("src/", ""), ("src/a.txt", "a"), ("dst/a.txt", "old")]).await;
        let request = FolderCopyRequest {
            source_prefix: "src".to_string(),
            target_prefix: "dst".to_string(),
            overwrite: false,
        };

        let result = service.copy_folder("test", &request).await.unwrap();
        assert_eq!(result.total_objects, 2);
        assert_eq!(result.copied, 0);
        assert_eq!(result.skipped, 1);
        assert!(!store.contains("dst/").await);

        let request = FolderCopyRequest {
            target_prefix: "moved".to_string(),
            ..request
        };
        let result = service.move_folder("test", &request).await.unwrap();
        assert_eq!(result.copied, 1);
        assert!(result.errors.is_empty());
        assert!(store.contains("src/").await);
        assert!(!store.contains("moved/").await);
        assert!(store.contains("moved/a.txt").await);
    }

    #[tokio::test]
    async fn test_move_folder() {
        let (service, store) = service_with(&[("src/a.txt", "a"), ("src/sub/b.txt", "b")]).await;
        let request = FolderCopyRequest {
            source_prefix: "src/".to_string(),
            target_prefix: "archive/src/".to_string(),
            overwrite: false,
        };

        let result = service.move_folder("test", &request).await.unwrap();
        assert_eq!(result.copied, 2);
        assert!(store.contains("archive/src/sub/b.txt").await);
        assert!(!store.contains("src/a.txt").await);
    }

    #[tokio::test]
    async fn test_folder_operation_rejects_nested_target() {
        let (service, _) = service_with(&[("src/a.txt", "a")]).await;
        let request = FolderCopyRequest {
            source_prefix: "src".to_string(),
            target_prefix: "src/".to_string(),
            overwrite: true,
        };
        let result = service.copy_folder("test", &request).await;
        assert!(matches!(result, Err(NavError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_objects_expands_prefixes() {
        let (service, store) = service_with(&[
            ("root.txt", "r"),
            ("logs/a.log", "a"),
            ("logs/b/c.log", "c"),
            ("keep.txt", "k"),
        ])
        .await;
        let request = DeleteObjectsRequest {
            keys: vec!["root.txt".to_string()],
            prefixes: vec!["logs".to_string()],
        };

        let deleted = service.delete_objects("test", &request).await.unwrap();
        assert_eq!(deleted.len(), 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_objects_rejects_empty_and_blank() {
        let (service, _) = service_with(&[("a.txt", "a")]).await;

        let empty = DeleteObjectsRequest::default();
        assert!(matches!(
            service.delete_objects("test", &empty).await,
            Err(NavError::Validation(_))
        ));

        let blank = DeleteObjectsRequest {
            keys: vec![],
            prefixes: vec!["  ".to_string()],
        };
        assert!(matches!(
            service.delete_objects("test", &blank).await,
            Err(NavError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_folder_counts_keys() {
        let (service, store) = service_with(&[
            ("logs/", ""),
            ("logs/a.log", "a"),
            ("logs/b.log", "b"),
            ("other.txt", "o"),
        ])
        .await;

        let count = service.delete_folder("test", "logs").await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_folder_size() {
        let (service, _) = service_with(&[
            ("logs/", ""),
            ("logs/app/a.log", "12345"),
            ("logs/app/b.log", "123"),
            ("other.txt", "xxxxxxxx"),
        ])
        .await;

        let size = service.folder_size("test", "logs/app/").await.unwrap();
        assert_eq!(size.prefix, "logs/app/");
        assert_eq!(size.total_size_bytes, 8);
        assert_eq!(size.object_count, 2);
    }
}
