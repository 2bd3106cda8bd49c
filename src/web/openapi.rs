//! OpenAPI document served by Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::AccessLevel;
use crate::folder_size::{
    FolderSizeEvent, FolderSizeEventKind, FolderSizeJobView, FolderSizeLaunchResponse,
    FolderSizeStatus,
};
use crate::storage::{
    Bucket, BulkCopyMoveRequest, BulkItem, BulkOperationResult, CopyMoveRequest,
    DeleteFolderRequest, DeleteFolderResponse, DeleteObjectsRequest, FolderCopyRequest,
    FolderItem, FolderOperationResult, FolderSizeRequest, FolderSizeResponse, ObjectItem,
    ObjectListResponse,
};
use crate::web::dto::{LoginRequest, LoginResponse, UserSession};
use crate::web::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "s3nav API", description = "Browse and manage S3 buckets"),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::buckets::list_buckets,
        handlers::objects::list_objects,
        handlers::objects::search_objects,
        handlers::objects::download_object,
        handlers::objects::copy_object,
        handlers::objects::move_object,
        handlers::objects::bulk_copy_objects,
        handlers::objects::bulk_move_objects,
        handlers::objects::delete_objects,
        handlers::folders::copy_folder,
        handlers::folders::move_folder,
        handlers::folders::delete_folder,
        handlers::folders::get_folder_size,
        handlers::folder_size::start_folder_size_job,
        handlers::folder_size::get_folder_size_job,
        handlers::folder_size::cancel_folder_size_job,
    ),
    components(schemas(
        AccessLevel,
        LoginRequest,
        LoginResponse,
        UserSession,
        Bucket,
        FolderItem,
        ObjectItem,
        ObjectListResponse,
        CopyMoveRequest,
        BulkItem,
        BulkCopyMoveRequest,
        BulkOperationResult,
        FolderCopyRequest,
        FolderOperationResult,
        DeleteObjectsRequest,
        DeleteFolderRequest,
        DeleteFolderResponse,
        FolderSizeRequest,
        FolderSizeResponse,
        FolderSizeStatus,
        FolderSizeEventKind,
        FolderSizeJobView,
        FolderSizeEvent,
        FolderSizeLaunchResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login and sessions"),
        (name = "buckets", description = "Configured buckets"),
        (name = "objects", description = "Object listing and operations"),
        (name = "folders", description = "Folder operations"),
        (name = "folder-size", description = "Asynchronous folder size jobs")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme used by the handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
