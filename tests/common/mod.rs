//! Shared fixtures for the web API tests.
//!
//! Builds the full application over in-memory stores and the embedded user
//! directory.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{json, Value};

use s3nav::auth::UserService;
use s3nav::config::{EmbeddedUser, FolderSizeConfig, LdapConfig, WebConfig};
use s3nav::folder_size::FolderSizeJobService;
use s3nav::storage::{
    Bucket, BucketEntry, BucketRegistry, ListPage, ListRequest, MemoryStore, ObjectBody,
    ObjectMeta, ObjectStore, StorageService, StoreError, StoreResult,
};
use s3nav::web::middleware::RateLimitState;
use s3nav::web::{create_app, AppState};

pub const PASSWORD: &str = "correct-horse";
pub const READ_ONLY_GROUP: &str = "cn=S3_ReadOnly,ou=Groups,dc=example,dc=com";
pub const READ_WRITE_GROUP: &str = "cn=S3_ReadWrite,ou=Groups,dc=example,dc=com";

/// A store whose listing never returns, so folder size jobs on it stay
/// running until canceled.
pub struct StalledStore;

#[async_trait]
impl ObjectStore for StalledStore {
    async fn list(&self, _request: ListRequest) -> StoreResult<ListPage> {
        std::future::pending().await
    }
    async fn head(&self, _key: &str) -> StoreResult<Option<ObjectMeta>> {
        Ok(None)
    }
    async fn get(&self, key: &str) -> StoreResult<ObjectBody> {
        Err(StoreError::NotFound(key.to_string()))
    }
    async fn copy(&self, _source: &str, _target: &str) -> StoreResult<()> {
        Ok(())
    }
    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
    async fn delete_many(&self, _keys: &[String]) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct TestApp {
    pub server: TestServer,
    /// Backing store of the `main` bucket.
    pub store: Arc<MemoryStore>,
    pub jobs: Arc<FolderSizeJobService>,
}

pub fn web_config() -> WebConfig {
    WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        login_rate_limit: 100,
        ..WebConfig::default()
    }
}

fn ldap_config() -> LdapConfig {
    let mut config = LdapConfig::default();
    config.embedded.enabled = true;
    let password_hash = s3nav::hash_password(PASSWORD).expect("hash");
    for (username, groups) in [
        ("reader", vec![READ_ONLY_GROUP]),
        ("writer", vec![READ_WRITE_GROUP]),
        ("outsider", vec![]),
    ] {
        config.embedded.users.push(EmbeddedUser {
            username: username.to_string(),
            password_hash: password_hash.clone(),
            member_of: groups.into_iter().map(str::to_string).collect(),
        });
    }
    config
}

fn bucket(id: &str, store: Arc<dyn ObjectStore>) -> BucketEntry {
    BucketEntry {
        bucket: Bucket {
            id: id.to_string(),
            name: format!("{id} bucket"),
            bucket_name: format!("{id}-bucket"),
        },
        store,
    }
}

/// Objects of the `main` bucket.
pub async fn seed(store: &MemoryStore) {
    store.put("docs/", Vec::new(), None).await;
    store.put("docs/readme.txt", "hello", Some("text/plain")).await;
    store.put("docs/report.pdf", vec![1u8; 2048], None).await;
    store.put("docs/archive/2023.csv", vec![2u8; 100], None).await;
    store.put("images/cat.png", vec![3u8; 300], Some("image/png")).await;
    store.put("notes.md", "# notes", None).await;
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(web_config(), FolderSizeConfig::default()).await
}

pub async fn spawn_app_with(web: WebConfig, folder_size: FolderSizeConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    seed(&store).await;

    let registry = Arc::new(
        BucketRegistry::new(vec![
            bucket("main", store.clone()),
            bucket("stalled", Arc::new(StalledStore)),
        ])
        .expect("registry"),
    );
    let storage = Arc::new(StorageService::new(Arc::clone(&registry)));
    let jobs = Arc::new(FolderSizeJobService::new(registry, folder_size));
    let users = Arc::new(UserService::from_config(&ldap_config()));

    let rate_limit = Arc::new(RateLimitState::new(web.login_rate_limit));
    let state = Arc::new(AppState::new(storage, Arc::clone(&jobs), users, &web));
    let app = create_app(state, rate_limit);

    let server = TestServer::builder()
        .http_transport()
        .build(app)
        .expect("Failed to create test server");

    TestApp {
        server,
        store,
        jobs,
    }
}

/// Log in and return the response body.
pub async fn login(server: &TestServer, username: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

/// Log in and return the bearer token.
pub async fn token(server: &TestServer, username: &str) -> String {
    login(server, username, PASSWORD).await["accessToken"]
        .as_str()
        .expect("accessToken")
        .to_string()
}
