//! Object handlers: listing, search, download, copy, move and delete.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::storage::{
    BulkCopyMoveRequest, BulkOperationResult, CopyMoveRequest, DeleteObjectsRequest,
    DownloadQuery, ListObjectsQuery, ObjectItem, ObjectListResponse, SearchQuery,
};
use crate::web::dto::ValidatedJson;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, WriteUser};

/// `Content-Disposition` value for downloading `filename`.
///
/// Control characters are dropped and quotes replaced in the plain
/// `filename` parameter; names that needed that, or are not ASCII, also get
/// an RFC 5987 `filename*`.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');
    if !needs_encoding {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// GET /api/buckets/{bucket_id}/objects - One folder level.
#[utoipa::path(
    get,
    path = "/api/buckets/{bucket_id}/objects",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID"), ListObjectsQuery),
    responses(
        (status = 200, description = "Folders and objects", body = ObjectListResponse),
        (status = 404, description = "Unknown bucket")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_objects(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(bucket_id): Path<String>,
    Query(query): Query<ListObjectsQuery>,
) -> Result<Json<ObjectListResponse>, ApiError> {
    let listing = state
        .storage
        .list_objects(
            &bucket_id,
            query.prefix.as_deref(),
            query.page_token.as_deref(),
        )
        .await?;
    Ok(Json(listing))
}

/// GET /api/buckets/{bucket_id}/search - Wildcard search under a prefix.
#[utoipa::path(
    get,
    path = "/api/buckets/{bucket_id}/search",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID"), SearchQuery),
    responses((status = 200, description = "Matching objects", body = ObjectListResponse)),
    security(("bearer_auth" = []))
)]
pub async fn search_objects(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(bucket_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ObjectListResponse>, ApiError> {
    let results = state
        .storage
        .search(&bucket_id, query.prefix.as_deref(), &query.query)
        .await?;
    Ok(Json(results))
}

/// GET /api/buckets/{bucket_id}/objects/download - Object content.
#[utoipa::path(
    get,
    path = "/api/buckets/{bucket_id}/objects/download",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID"), DownloadQuery),
    responses(
        (status = 200, description = "Object content", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown bucket or key")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_object(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(bucket_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    if query.key.trim().is_empty() {
        return Err(ApiError::bad_request("key is required"));
    }
    let download = state.storage.download(&bucket_id, &query.key).await?;
    tracing::debug!(username = %claims.sub, bucket = %bucket_id, key = %query.key, "Download");

    Response::builder()
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.file_name),
        )
        .body(Body::from(download.bytes))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/buckets/{bucket_id}/objects/copy - Copy one object.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/objects/copy",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = CopyMoveRequest,
    responses(
        (status = 200, description = "The new object", body = ObjectItem),
        (status = 403, description = "Read-only user"),
        (status = 409, description = "Target exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn copy_object(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CopyMoveRequest>,
) -> Result<Json<ObjectItem>, ApiError> {
    let item = state.storage.copy(&bucket_id, &req).await?;
    tracing::info!(username = %claims.sub, bucket = %bucket_id, source = %req.source_key, target = %req.target_key, "Copied object");
    Ok(Json(item))
}

/// POST /api/buckets/{bucket_id}/objects/move - Move one object.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/objects/move",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = CopyMoveRequest,
    responses(
        (status = 200, description = "The moved object", body = ObjectItem),
        (status = 403, description = "Read-only user"),
        (status = 409, description = "Target exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn move_object(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CopyMoveRequest>,
) -> Result<Json<ObjectItem>, ApiError> {
    let item = state.storage.move_object(&bucket_id, &req).await?;
    tracing::info!(username = %claims.sub, bucket = %bucket_id, source = %req.source_key, target = %req.target_key, "Moved object");
    Ok(Json(item))
}

/// POST /api/buckets/{bucket_id}/objects/bulk-copy - Copy several objects.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/objects/bulk-copy",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = BulkCopyMoveRequest,
    responses((status = 200, description = "Per-item results", body = Vec<BulkOperationResult>)),
    security(("bearer_auth" = []))
)]
pub async fn bulk_copy_objects(
    State(state): State<Arc<AppState>>,
    _user: WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<BulkCopyMoveRequest>,
) -> Result<Json<Vec<BulkOperationResult>>, ApiError> {
    Ok(Json(state.storage.bulk_copy(&bucket_id, &req).await?))
}

/// POST /api/buckets/{bucket_id}/objects/bulk-move - Move several objects.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/objects/bulk-move",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = BulkCopyMoveRequest,
    responses((status = 200, description = "Per-item results", body = Vec<BulkOperationResult>)),
    security(("bearer_auth" = []))
)]
pub async fn bulk_move_objects(
    State(state): State<Arc<AppState>>,
    _user: WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<BulkCopyMoveRequest>,
) -> Result<Json<Vec<BulkOperationResult>>, ApiError> {
    Ok(Json(state.storage.bulk_move(&bucket_id, &req).await?))
}

/// DELETE /api/buckets/{bucket_id}/objects - Delete keys and prefixes.
#[utoipa::path(
    delete,
    path = "/api/buckets/{bucket_id}/objects",
    tag = "objects",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = DeleteObjectsRequest,
    responses(
        (status = 200, description = "Deleted keys", body = Vec<String>),
        (status = 400, description = "Nothing to delete")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_objects(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<DeleteObjectsRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let deleted = state.storage.delete_objects(&bucket_id, &req).await?;
    tracing::info!(username = %claims.sub, bucket = %bucket_id, deleted = deleted.len(), "Deleted objects");
    Ok(Json(deleted))
}
