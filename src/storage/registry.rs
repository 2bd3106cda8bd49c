//! Configured buckets and their stores.

use std::sync::Arc;

use tracing::info;

use super::memory::MemoryStore;
use super::s3::S3Store;
use super::store::ObjectStore;
use super::types::Bucket;
use crate::config::{S3Config, StoreBackend};
use crate::{NavError, Result};

/// A bucket together with the store that serves it.
#[derive(Clone)]
pub struct BucketEntry {
    pub bucket: Bucket,
    pub store: Arc<dyn ObjectStore>,
}

/// Lookup of configured buckets by id, in configuration order.
#[derive(Clone)]
pub struct BucketRegistry {
    entries: Vec<BucketEntry>,
}

impl BucketRegistry {
    /// Build the registry from configuration, creating one store per bucket.
    pub fn from_config(config: &S3Config) -> Result<Self> {
        let entries = config
            .buckets
            .iter()
            .map(|bucket| {
                let store: Arc<dyn ObjectStore> = match bucket.backend {
                    StoreBackend::S3 => Arc::new(S3Store::new(bucket)),
                    StoreBackend::Memory => Arc::new(MemoryStore::new()),
                };
                info!(id = %bucket.id, backend = ?bucket.backend, "Registered bucket");
                BucketEntry {
                    bucket: Bucket {
                        id: bucket.id.clone(),
                        name: bucket.name.clone(),
                        bucket_name: bucket.bucket_name.clone(),
                    },
                    store,
                }
            })
            .collect();
        Self::new(entries)
    }

    /// Build the registry from ready-made entries.
    pub fn new(entries: Vec<BucketEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(NavError::Config("No S3 buckets configured".to_string()));
        }
        Ok(Self { entries })
    }

    /// All buckets.
    pub fn list(&self) -> Vec<Bucket> {
        self.entries.iter().map(|e| e.bucket.clone()).collect()
    }

    /// The bucket with `id`, or NotFound.
    pub fn require(&self, id: &str) -> Result<&BucketEntry> {
        self.entries
            .iter()
            .find(|e| e.bucket.id == id)
            .ok_or_else(|| NavError::NotFound(format!("Bucket '{id}'")))
    }
}
