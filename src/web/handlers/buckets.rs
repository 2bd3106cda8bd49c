//! Bucket handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::storage::Bucket;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/buckets - Configured buckets.
#[utoipa::path(
    get,
    path = "/api/buckets",
    tag = "buckets",
    responses(
        (status = 200, description = "Configured buckets", body = Vec<Bucket>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_buckets(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Json<Vec<Bucket>> {
    Json(state.storage.list_buckets())
}
