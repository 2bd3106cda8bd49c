//! s3nav - a web file manager for S3-compatible object stores.
//!
//! Folder navigation over key prefixes, search, download, copy, move and
//! delete, LDAP logins with read-only and read-write access, and
//! asynchronous folder size jobs streamed over WebSocket.

pub mod auth;
pub mod config;
pub mod error;
pub mod folder_size;
pub mod keys;
pub mod logging;
pub mod storage;
pub mod web;

pub use auth::{hash_password, verify_password, AccessLevel, AuthError, UserService};
pub use config::Config;
pub use error::{NavError, Result};
pub use folder_size::FolderSizeJobService;
pub use storage::{BucketRegistry, StorageService};
pub use web::{AppState, WebServer};
