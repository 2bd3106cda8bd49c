//! Wire types of the storage API.
//!
//! Field names are camelCase to match the browser client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A configured bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    pub name: String,
    pub bucket_name: String,
}

/// A folder (common prefix) in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderItem {
    pub name: String,
    pub prefix: String,
}

/// An object in a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectItem {
    pub key: String,
    pub name: String,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: String,
}

/// One folder level of a bucket.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectListResponse {
    pub current_prefix: String,
    pub folders: Vec<FolderItem>,
    pub objects: Vec<ObjectItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Query of `GET /objects`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListObjectsQuery {
    /// Folder prefix; root when absent.
    pub prefix: Option<String>,
    /// Continuation token from a previous page.
    pub page_token: Option<String>,
}

/// Query of `GET /search`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Wildcard pattern, `*` matches anything.
    #[serde(default)]
    pub query: String,
    /// Folder to search under; whole bucket when absent.
    pub prefix: Option<String>,
}

/// Query of `GET /objects/download`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Object key.
    pub key: String,
}

/// Copy or move a single object.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyMoveRequest {
    #[validate(length(min = 1, message = "sourceKey must not be empty"))]
    pub source_key: String,
    #[validate(length(min = 1, message = "targetKey must not be empty"))]
    pub target_key: String,
    #[serde(default)]
    pub overwrite: bool,
}

/// One entry of a bulk request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkItem {
    #[validate(length(min = 1, message = "sourceKey must not be empty"))]
    pub source_key: String,
    #[validate(length(min = 1, message = "targetKey must not be empty"))]
    pub target_key: String,
}

/// Copy or move several objects.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCopyMoveRequest {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<BulkItem>,
    #[serde(default)]
    pub overwrite: bool,
}

/// Outcome of one bulk entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub source_key: String,
    pub target_key: String,
    pub success: bool,
    pub message: String,
}

/// Copy or move a folder.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderCopyRequest {
    #[validate(length(min = 1, message = "sourcePrefix must not be empty"))]
    pub source_prefix: String,
    #[serde(default)]
    pub target_prefix: String,
    #[serde(default)]
    pub overwrite: bool,
}

/// Summary of a folder copy or move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderOperationResult {
    pub source_prefix: String,
    pub target_prefix: String,
    pub total_objects: usize,
    pub copied: usize,
    pub skipped: usize,
    /// One failed entry per skipped or failed key.
    pub errors: Vec<BulkOperationResult>,
}

/// Delete keys and whole prefixes.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteObjectsRequest {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl DeleteObjectsRequest {
    /// Nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.prefixes.is_empty()
    }
}

/// Delete a folder.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderRequest {
    #[validate(length(min = 1, message = "prefix must not be empty"))]
    pub prefix: String,
}

/// Result of a folder delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderResponse {
    pub deleted_count: usize,
}

/// Folder size request, for both the synchronous and the job endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FolderSizeRequest {
    #[serde(default)]
    pub prefix: String,
}

/// Synchronous folder size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderSizeResponse {
    pub prefix: String,
    pub total_size_bytes: u64,
    pub object_count: u64,
}

/// A downloaded object.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}
