//! Folder size job handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::folder_size::{FolderSizeJobView, FolderSizeLaunchResponse};
use crate::storage::FolderSizeRequest;
use crate::web::dto::ValidatedJson;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, WriteUser};

/// POST /api/buckets/{bucket_id}/folders/size - Launch a folder size job.
#[utoipa::path(
    post,
    path = "/api/buckets/{bucket_id}/folders/size",
    tag = "folder-size",
    params(("bucket_id" = String, Path, description = "Bucket ID")),
    request_body = FolderSizeRequest,
    responses(
        (status = 200, description = "Queued job and its stream path", body = FolderSizeLaunchResponse),
        (status = 403, description = "Read-write access required"),
        (status = 404, description = "Unknown bucket")
    ),
    security(("bearer_auth" = []))
)]
pub async fn start_folder_size_job(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path(bucket_id): Path<String>,
    ValidatedJson(req): ValidatedJson<FolderSizeRequest>,
) -> Result<Json<FolderSizeLaunchResponse>, ApiError> {
    let launch = state.jobs.start(&bucket_id, &req.prefix).await?;
    tracing::debug!(username = %claims.sub, job_id = %launch.job.id, "Folder size job requested");
    Ok(Json(launch))
}

/// GET /api/buckets/{bucket_id}/folders/size/{job_id} - Job state.
#[utoipa::path(
    get,
    path = "/api/buckets/{bucket_id}/folders/size/{job_id}",
    tag = "folder-size",
    params(
        ("bucket_id" = String, Path, description = "Bucket ID"),
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job state", body = FolderSizeJobView),
        (status = 404, description = "Unknown job")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_folder_size_job(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path((bucket_id, job_id)): Path<(String, String)>,
) -> Result<Json<FolderSizeJobView>, ApiError> {
    Ok(Json(state.jobs.get(&bucket_id, &job_id).await?))
}

/// DELETE /api/buckets/{bucket_id}/folders/size/{job_id} - Cancel a job.
#[utoipa::path(
    delete,
    path = "/api/buckets/{bucket_id}/folders/size/{job_id}",
    tag = "folder-size",
    params(
        ("bucket_id" = String, Path, description = "Bucket ID"),
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job state after cancel", body = FolderSizeJobView),
        (status = 403, description = "Read-write access required"),
        (status = 404, description = "Unknown job")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_folder_size_job(
    State(state): State<Arc<AppState>>,
    WriteUser(claims): WriteUser,
    Path((bucket_id, job_id)): Path<(String, String)>,
) -> Result<Json<FolderSizeJobView>, ApiError> {
    let view = state.jobs.cancel(&bucket_id, &job_id).await?;
    tracing::debug!(username = %claims.sub, job_id = %job_id, status = ?view.status, "Folder size job cancel requested");
    Ok(Json(view))
}
