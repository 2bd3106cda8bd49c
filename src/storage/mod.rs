//! Object storage: the store abstraction, its implementations and the
//! operations the API exposes over them.

pub mod memory;
pub mod registry;
pub mod s3;
pub mod service;
pub mod store;
pub mod types;

pub use memory::MemoryStore;
pub use registry::{BucketEntry, BucketRegistry};
pub use s3::S3Store;
pub use service::{StorageService, DEFAULT_CONTENT_TYPE};
pub use store::{
    list_all, ListPage, ListRequest, ObjectBody, ObjectMeta, ObjectStore, StoreError,
    StoreResult, PAGE_SIZE,
};
pub use types::*;
