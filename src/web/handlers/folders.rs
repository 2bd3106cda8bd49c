//! Folder handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::storage::{
    DeleteFolderRequest, DeleteFolderResponse, FolderCopyRequest, FolderOperationResult,
    FolderSizeRequest, FolderSizeResponse,
};
use crate::web::dto::ValidatedJson;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, WriteUser};

/// POST /api/buckets/{bucket_id}/folders/copy - Copy every key under a prefix.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/folders/copy",
    tag = "folders",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = FolderCopyRequest,
    responses((status = 200, description = "Copy summary", body = FolderOperationResult)),
    security(("bearer_auth" = []))
)]
pub async fn copy_folder(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<FolderCopyRequest>,
) -> Result<Json<FolderOperationResult>, ApiError> {
    let result = state.storage.copy_folder(&bucket_id, &req).await?;
    tracing::info!(
        username = %claims.sub,
        bucket = %bucket_id,
        copied = result.copied,
        skipped = result.skipped,
        "Copied folder"
    );
    Ok(Json(result))
}

/// POST /api/buckets/{bucket_id}/folders/move - Move every key under a prefix.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/folders/move",
    tag = "folders",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = FolderCopyRequest,
    responses((status = 200, description = "Move summary", body = FolderOperationResult)),
    security(("bearer_auth" = []))
)]
pub async fn move_folder(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<FolderCopyRequest>,
) -> Result<Json<FolderOperationResult>, ApiError> {
    let result = state.storage.move_folder(&bucket_id, &req).await?;
    tracing::info!(
        username = %claims.sub,
        bucket = %bucket_id,
        moved = result.copied,
        skipped = result.skipped,
        "Moved folder"
    );
    Ok(Json(result))
}

/// DELETE /api/buckets/{bucket_id}/folders - Delete a folder.
#[utoipa::path(
    delete,
    path = "/api/buckets/{bucket_id}/folders",
    tag = "folders",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = DeleteFolderRequest,
    responses((status = 200, description = "Number of deleted objects", body = DeleteFolderResponse)),
    security(("bearer_auth" = []))
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<DeleteFolderRequest>,
) -> Result<Json<DeleteFolderResponse>, ApiError> {
    let deleted_count = state.storage.delete_folder(&bucket_id, &req.prefix).await?;
    tracing::info!(username = %claims.sub, bucket = %bucket_id, prefix = %req.prefix, deleted_count, "Deleted folder");
    Ok(Json(DeleteFolderResponse { deleted_count }))
}

/// GET /api/buckets/{bucket_id}/folders/size - Folder size, computed inline.
#[utoipa::path(
    get,
    path = "/api/buckets/{bucket_id}/folders/size",
    tag = "folders",
    params(("bucket_id" = String, Path, description = "Bucket ID"), FolderSizeRequest),
    responses((status = 200, description = "Folder size", body = FolderSizeResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_folder_size(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(bucket_id): Path<String>,
    Query(query): Query<FolderSizeRequest>,
) -> Result<Json<FolderSizeResponse>, ApiError> {
    Ok(Json(state.storage.folder_size(&bucket_id, &query.prefix).await?))
}
