//! Web API for s3nav.
//!
//! REST endpoints under `/api`, the folder size progress stream and the
//! Swagger UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;
pub mod ws;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_app, create_router};
pub use server::WebServer;
