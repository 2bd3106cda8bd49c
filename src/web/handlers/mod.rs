//! API handlers.

pub mod auth;
pub mod buckets;
pub mod folder_size;
pub mod folders;
pub mod objects;

use std::sync::Arc;

use crate::auth::UserService;
use crate::config::WebConfig;
use crate::folder_size::FolderSizeJobService;
use crate::storage::StorageService;
use crate::web::middleware::JwtState;

pub use auth::*;
pub use buckets::*;
pub use folder_size::*;
pub use folders::*;
pub use objects::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageService>,
    pub jobs: Arc<FolderSizeJobService>,
    pub users: Arc<UserService>,
    pub jwt: Arc<JwtState>,
    /// Session cookie settings come from here.
    pub web_config: WebConfig,
}

impl AppState {
    pub fn new(
        storage: Arc<StorageService>,
        jobs: Arc<FolderSizeJobService>,
        users: Arc<UserService>,
        web_config: &WebConfig,
    ) -> Self {
        Self {
            storage,
            jobs,
            users,
            jwt: Arc::new(JwtState::new(
                &web_config.jwt_secret,
                web_config.session_expiry_secs,
            )),
            web_config: web_config.clone(),
        }
    }
}
