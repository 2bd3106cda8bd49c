//! Router configuration for the web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    bulk_copy_objects, bulk_move_objects, cancel_folder_size_job, copy_folder, copy_object,
    delete_folder, delete_objects, download_object, get_folder_size, get_folder_size_job,
    list_buckets, list_objects, login, logout, me, move_folder, move_object, search_objects,
    start_folder_size_job, AppState,
};
use super::middleware::{
    create_cors_layer, jwt_auth, login_rate_limit, security_headers, RateLimitState,
};
use super::openapi::ApiDoc;
use super::ws::folder_size_ws_handler;

/// Create the `/api` router.
pub fn create_router(app_state: Arc<AppState>, rate_limit: Arc<RateLimitState>) -> Router {
    let login_route = post(login).layer(middleware::from_fn(move |req, next| {
        let state = Arc::clone(&rate_limit);
        login_rate_limit(state, req, next)
    }));

    let auth_routes = Router::new()
        .route("/login", login_route)
        .route("/logout", post(logout))
        .route("/me", get(me));

    let bucket_routes = Router::new()
        .route("/", get(list_buckets))
        .route("/:bucket_id/objects", get(list_objects).delete(delete_objects))
        .route("/:bucket_id/search", get(search_objects))
        .route("/:bucket_id/objects/download", get(download_object))
        .route("/:bucket_id/objects/copy", post(copy_object))
        .route("/:bucket_id/objects/move", post(move_object))
        .route("/:bucket_id/objects/bulk-copy", post(bulk_copy_objects))
        .route("/:bucket_id/objects/bulk-move", post(bulk_move_objects))
        .route("/:bucket_id/folders", axum::routing::delete(delete_folder))
        .route("/:bucket_id/folders/copy", post(copy_folder))
        .route("/:bucket_id/folders/move", post(move_folder))
        .route(
            "/:bucket_id/folders/size",
            get(get_folder_size).post(start_folder_size_job),
        )
        .route(
            "/:bucket_id/folders/size/:job_id",
            get(get_folder_size_job).delete(cancel_folder_size_job),
        );

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/buckets", bucket_routes)
        .route("/ws/folder-size/:job_id", get(folder_size_ws_handler));

    let jwt_state = Arc::clone(&app_state.jwt);
    let cors_origins = app_state.web_config.cors_origins.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = Arc::clone(&jwt_state);
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// The complete application: API, health check, Swagger UI and, when
/// enabled, the built frontend.
pub fn create_app(app_state: Arc<AppState>, rate_limit: Arc<RateLimitState>) -> Router {
    let serve_static = app_state.web_config.serve_static;
    let static_path = app_state.web_config.static_path.clone();

    let mut router = create_router(app_state, rate_limit)
        .merge(create_health_router())
        .merge(create_swagger_router());

    if serve_static {
        if let Some(static_router) = create_static_router(&static_path) {
            router = router.merge(static_router);
        }
    }

    router.layer(CompressionLayer::new())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Serve the single-page frontend from `static_path`, falling back to its
/// `index.html` for client-side routes.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let root = Path::new(static_path);
    if !root.is_dir() {
        tracing::warn!(path = %static_path, "Static file directory not found, not serving frontend");
        return None;
    }

    let index = root.join("index.html");
    let service = ServeDir::new(root).fallback(ServeFile::new(index));
    tracing::info!(path = %static_path, "Serving frontend");
    Some(Router::new().fallback_service(service))
}
