//! Recursive folder size computation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::keys::{is_directory_marker, normalize_prefix};
use crate::storage::{ListRequest, ObjectStore, StoreError};

/// Error that stops a computation.
#[derive(Error, Debug)]
pub enum FolderSizeError {
    /// The cancel flag was raised.
    #[error("folder size calculation cancelled")]
    Canceled,

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Caps applied to a computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanLimits {
    /// Stop after this many objects (0 = unlimited).
    pub max_objects: u64,
    /// Stop after this much time.
    pub max_runtime: Option<Duration>,
}

impl ScanLimits {
    fn objects_exhausted(&self, count: u64) -> bool {
        self.max_objects > 0 && count >= self.max_objects
    }

    fn runtime_exhausted(&self, started: Instant) -> bool {
        self.max_runtime
            .is_some_and(|max| started.elapsed() > max)
    }
}

/// Why a computation stopped before listing everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialReason {
    MaxObjects,
    MaxRuntime,
}

impl PartialReason {
    /// Wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartialReason::MaxObjects => "max-objects",
            PartialReason::MaxRuntime => "max-runtime",
        }
    }

    /// Message shown to the user.
    pub fn message(&self) -> String {
        format!("Stopped after hitting {} cap", self.as_str())
    }
}

impl std::fmt::Display for PartialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals of a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanTotals {
    pub objects_scanned: u64,
    pub total_size_bytes: u64,
    pub partial_reason: Option<PartialReason>,
}

impl ScanTotals {
    /// Whether a cap cut the scan short.
    pub fn partial(&self) -> bool {
        self.partial_reason.is_some()
    }
}

/// Sum object sizes under `prefix`.
///
/// `on_progress` receives running totals every `page_interval` pages and
/// after the last page. Directory markers are not counted.
pub async fn compute<F>(
    store: &dyn ObjectStore,
    prefix: &str,
    limits: ScanLimits,
    cancel: &AtomicBool,
    page_interval: u32,
    mut on_progress: F,
) -> Result<ScanTotals, FolderSizeError>
where
    F: FnMut(&ScanTotals) + Send,
{
    let prefix = normalize_prefix(Some(prefix));
    let page_interval = page_interval.max(1);
    let started = Instant::now();
    let check_cancel = || {
        if cancel.load(Ordering::SeqCst) {
            Err(FolderSizeError::Canceled)
        } else {
            Ok(())
        }
    };

    let mut totals = ScanTotals::default();
    let mut token = None;
    let mut pages = 0u32;

    loop {
        check_cancel()?;
        if limits.objects_exhausted(totals.objects_scanned) {
            totals.partial_reason = Some(PartialReason::MaxObjects);
            break;
        }
        if limits.runtime_exhausted(started) {
            totals.partial_reason = Some(PartialReason::MaxRuntime);
            break;
        }

        let page = store
            .list(ListRequest::recursive(prefix.as_str()).after(token))
            .await?;

        for object in page.objects.iter().filter(|o| !is_directory_marker(&o.key)) {
            totals.total_size_bytes += object.size;
            totals.objects_scanned += 1;
            if limits.objects_exhausted(totals.objects_scanned) {
                totals.partial_reason = Some(PartialReason::MaxObjects);
                break;
            }
            check_cancel()?;
            if limits.runtime_exhausted(started) {
                totals.partial_reason = Some(PartialReason::MaxRuntime);
                break;
            }
        }

        token = page.next_token;
        pages = pages.wrapping_add(1);
        if token.is_none() || pages % page_interval == 0 {
            on_progress(&totals);
        }
        if token.is_none() || totals.partial() {
            break;
        }
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ListPage, MemoryStore, ObjectBody, ObjectMeta, StoreResult};
    use async_trait::async_trait;

    async fn store_with(count: usize, size: usize) -> MemoryStore {
        let store = MemoryStore::new();
        store.put("data/", "", None).await;
        for i in 0..count {
            store.put(&format!("data/{i:05}.bin"), vec![0u8; size], None).await;
        }
        store.put("elsewhere.bin", vec![0u8; 100], None).await;
        store
    }

    #[tokio::test]
    async fn test_sums_sizes_and_skips_markers() {
        let store = store_with(1200, 3).await;
        let cancel = AtomicBool::new(false);
        let mut reports = Vec::new();

        let totals = compute(&store, "data", ScanLimits::default(), &cancel, 1, |t| {
            reports.push(*t)
        })
        .await
        .unwrap();

        assert_eq!(totals.objects_scanned, 1200);
        assert_eq!(totals.total_size_bytes, 3600);
        assert!(!totals.partial());
        // 1201 keys with the marker: pages of 500, 500, 201
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].objects_scanned, 499);
        assert_eq!(reports[2].objects_scanned, 1200);
    }

    #[tokio::test]
    async fn test_progress_interval() {
        let store = store_with(2400, 1).await;
        let cancel = AtomicBool::new(false);
        let mut reports = 0;

        compute(&store, "data/", ScanLimits::default(), &cancel, 2, |_| {
            reports += 1
        })
        .await
        .unwrap();

        // 5 pages: reports after page 2, page 4 and the last page
        assert_eq!(reports, 3);
    }

    #[tokio::test]
    async fn test_max_objects_cap_is_exact() {
        let store = store_with(1200, 2).await;
        let cancel = AtomicBool::new(false);
        let limits = ScanLimits {
            max_objects: 700,
            max_runtime: None,
        };

        let totals = compute(&store, "data/", limits, &cancel, 1, |_| {})
            .await
            .unwrap();

        assert_eq!(totals.objects_scanned, 700);
        assert_eq!(totals.total_size_bytes, 1400);
        assert_eq!(totals.partial_reason, Some(PartialReason::MaxObjects));
        assert_eq!(
            PartialReason::MaxObjects.message(),
            "Stopped after hitting max-objects cap"
        );
    }

    #[tokio::test]
    async fn test_cancel_flag() {
        let store = store_with(10, 1).await;
        let cancel = AtomicBool::new(true);

        let result = compute(&store, "data/", ScanLimits::default(), &cancel, 1, |_| {}).await;
        assert!(matches!(result, Err(FolderSizeError::Canceled)));
    }

    /// Sleeps before every list call.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl ObjectStore for SlowStore {
        async fn list(&self, request: ListRequest) -> StoreResult<ListPage> {
            tokio::time::sleep(self.delay).await;
            self.inner.list(request).await
        }
        async fn head(&self, key: &str) -> StoreResult<Option<ObjectMeta>> {
            self.inner.head(key).await
        }
        async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
            self.inner.get(key).await
        }
        async fn copy(&self, source: &str, target: &str) -> StoreResult<()> {
            self.inner.copy(source, target).await
        }
        async fn delete(&self, key: &str) -> StoreResult<()> {
            self.inner.delete(key).await
        }
        async fn delete_many(&self, keys: &[String]) -> StoreResult<Vec<String>> {
            self.inner.delete_many(keys).await
        }
    }

    #[tokio::test]
    async fn test_max_runtime_cap() {
        let store = SlowStore {
            inner: store_with(1500, 1).await,
            delay: Duration::from_millis(30),
        };
        let cancel = AtomicBool::new(false);
        let limits = ScanLimits {
            max_objects: 0,
            max_runtime: Some(Duration::from_millis(10)),
        };

        let totals = compute(&store, "data/", limits, &cancel, 1, |_| {})
            .await
            .unwrap();

        assert_eq!(totals.partial_reason, Some(PartialReason::MaxRuntime));
        assert!(totals.objects_scanned < 1500);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        struct BrokenStore;

        #[async_trait]
        impl ObjectStore for BrokenStore {
            async fn list(&self, _request: ListRequest) -> StoreResult<ListPage> {
                Err(StoreError::Backend("access denied".to_string()))
            }
            async fn head(&self, _key: &str) -> StoreResult<Option<ObjectMeta>> {
                Ok(None)
            }
            async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
                Err(StoreError::NotFound(key.to_string()))
            }
            async fn copy(&self, _source: &str, _target: &str) -> StoreResult<()> {
                Ok(())
            }
            async fn delete(&self, _key: &str) -> StoreResult<()> {
                Ok(())
            }
            async fn delete_many(&self, _keys: &[String]) -> StoreResult<Vec<String>> {
                Ok(Vec::new())
            }
        }

        let cancel = AtomicBool::new(false);
        let result = compute(&BrokenStore, "", ScanLimits::default(), &cancel, 1, |_| {}).await;
        match result {
            Err(FolderSizeError::Storage(e)) => assert_eq!(e.to_string(), "access denied"),
            other => panic!("Expected storage error, got {other:?}"),
        }
    }
}
