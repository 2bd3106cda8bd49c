//! Configuration module for s3nav.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::{NavError, Result};

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Session token lifetime in seconds.
    #[serde(default = "default_session_expiry")]
    pub session_expiry_secs: u64,
    /// Mark the session cookie as `Secure`.
    #[serde(default)]
    pub secure_cookie: bool,
    /// Whether to serve the built frontend.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Rate limit for the login endpoint (requests per minute per client).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:9071".to_string(),
        "http://localhost:9080".to_string(),
    ]
}

fn default_session_expiry() -> u64 {
    8 * 60 * 60 // 8 hours
}

fn default_static_path() -> String {
    "web/dist".to_string()
}

fn default_login_rate_limit() -> u32 {
    10
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: default_cors_origins(),
            jwt_secret: String::new(),
            session_expiry_secs: default_session_expiry(),
            secure_cookie: false,
            serve_static: false,
            static_path: default_static_path(),
            login_rate_limit: default_login_rate_limit(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/s3nav.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Which object store implementation backs a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// S3-compatible service reached over HTTP.
    #[default]
    S3,
    /// In-process store, contents are lost on restart.
    Memory,
}

/// A bucket exposed to users.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketConfig {
    /// Identifier used in API paths.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Bucket name on the storage service.
    pub bucket_name: String,
    /// Custom endpoint (MinIO, Ceph, ...). AWS is used when absent.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Access key id.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Use path-style addressing instead of virtual-hosted buckets.
    #[serde(default)]
    pub path_style_access: bool,
    /// Store implementation.
    #[serde(default)]
    pub backend: StoreBackend,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct S3Config {
    /// Configured buckets.
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
}

/// Folder size job configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderSizeConfig {
    /// Maximum number of jobs scanning at the same time.
    #[serde(default = "default_max_parallel_jobs")]
    pub max_parallel_jobs: usize,
    /// Emit a progress event every N listed pages.
    #[serde(default = "default_progress_page_interval")]
    pub progress_page_interval: u32,
    /// Stop after this many objects (0 = unlimited).
    #[serde(default)]
    pub max_objects: u64,
    /// Stop after this many seconds (0 = unlimited).
    #[serde(default)]
    pub max_runtime_secs: u64,
    /// How long finished jobs stay queryable, in seconds.
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    /// Cancel a running job when its last listener disconnects.
    #[serde(default)]
    pub cancel_on_disconnect: bool,
}

fn default_max_parallel_jobs() -> usize {
    2
}

fn default_progress_page_interval() -> u32 {
    1
}

fn default_retention() -> u64 {
    600 // 10 minutes
}

impl Default for FolderSizeConfig {
    fn default() -> Self {
        Self {
            max_parallel_jobs: default_max_parallel_jobs(),
            progress_page_interval: default_progress_page_interval(),
            max_objects: 0,
            max_runtime_secs: 0,
            retention_secs: default_retention(),
            cancel_on_disconnect: false,
        }
    }
}

impl FolderSizeConfig {
    /// Worker pool size; zero falls back to the default.
    pub fn parallel_jobs(&self) -> usize {
        if self.max_parallel_jobs > 0 {
            self.max_parallel_jobs
        } else {
            default_max_parallel_jobs()
        }
    }

    /// Progress interval in pages; zero falls back to every page.
    pub fn page_interval(&self) -> u32 {
        self.progress_page_interval.max(1)
    }

    /// Runtime cap, if any.
    pub fn max_runtime(&self) -> Option<Duration> {
        (self.max_runtime_secs > 0).then(|| Duration::from_secs(self.max_runtime_secs))
    }

    /// Retention of finished jobs; zero falls back to the default.
    pub fn retention(&self) -> Duration {
        if self.retention_secs > 0 {
            Duration::from_secs(self.retention_secs)
        } else {
            Duration::from_secs(default_retention())
        }
    }
}

/// What to do with an authenticated user that matches no configured role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoRolePolicy {
    /// Refuse the login.
    #[default]
    Deny,
    /// Grant read-only access.
    ReadOnly,
}

/// A user of the embedded directory.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedUser {
    /// Login name.
    pub username: String,
    /// Argon2 PHC hash (see `s3nav hash-password`).
    pub password_hash: String,
    /// Group DNs the user belongs to.
    #[serde(default)]
    pub member_of: Vec<String>,
}

/// Embedded directory for local development.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmbeddedLdapConfig {
    /// Use the embedded directory instead of a real LDAP server.
    #[serde(default)]
    pub enabled: bool,
    /// Directory users.
    #[serde(default)]
    pub users: Vec<EmbeddedUser>,
}

/// LDAP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LdapConfig {
    /// Whether LDAP logins are enabled.
    #[serde(default = "default_ldap_enabled")]
    pub enabled: bool,
    /// Server URL (`ldap://` or `ldaps://`).
    #[serde(default = "default_ldap_url")]
    pub url: String,
    /// Directory base DN.
    #[serde(default = "default_base_dn")]
    pub base_dn: String,
    /// Service account DN used for user searches.
    #[serde(default = "default_bind_dn")]
    pub bind_dn: String,
    /// Service account password.
    #[serde(default)]
    pub bind_password: String,
    /// Search base for user entries.
    #[serde(default = "default_user_search_base")]
    pub user_search_base: String,
    /// Search filter; `{0}` is replaced with the escaped username.
    #[serde(default = "default_user_search_filter")]
    pub user_search_filter: String,
    /// Groups granting read-only access.
    #[serde(default = "default_read_only_groups")]
    pub read_only_groups: Vec<String>,
    /// Groups granting read-write access.
    #[serde(default = "default_read_write_groups")]
    pub read_write_groups: Vec<String>,
    /// Usernames granted read-only access.
    #[serde(default)]
    pub read_only_users: Vec<String>,
    /// Usernames granted read-write access.
    #[serde(default)]
    pub read_write_users: Vec<String>,
    /// Skip certificate verification for `ldaps://`.
    #[serde(default)]
    pub ignore_ssl_validation: bool,
    /// Policy for users without a matching role.
    #[serde(default)]
    pub no_role_policy: NoRolePolicy,
    /// Embedded directory.
    #[serde(default)]
    pub embedded: EmbeddedLdapConfig,
}

fn default_ldap_enabled() -> bool {
    true
}

fn default_ldap_url() -> String {
    "ldap://localhost:1389".to_string()
}

fn default_base_dn() -> String {
    "dc=example,dc=com".to_string()
}

fn default_bind_dn() -> String {
    "cn=ldap-reader,ou=ServiceAccounts,dc=example,dc=com".to_string()
}

fn default_user_search_base() -> String {
    "ou=Users,dc=example,dc=com".to_string()
}

fn default_user_search_filter() -> String {
    "(sAMAccountName={0})".to_string()
}

fn default_read_only_groups() -> Vec<String> {
    vec!["cn=S3_ReadOnly,ou=Groups,dc=example,dc=com".to_string()]
}

fn default_read_write_groups() -> Vec<String> {
    vec!["cn=S3_ReadWrite,ou=Groups,dc=example,dc=com".to_string()]
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            enabled: default_ldap_enabled(),
            url: default_ldap_url(),
            base_dn: default_base_dn(),
            bind_dn: default_bind_dn(),
            bind_password: String::new(),
            user_search_base: default_user_search_base(),
            user_search_filter: default_user_search_filter(),
            read_only_groups: default_read_only_groups(),
            read_write_groups: default_read_write_groups(),
            read_only_users: vec![],
            read_write_users: vec![],
            ignore_ssl_validation: false,
            no_role_policy: NoRolePolicy::Deny,
            embedded: EmbeddedLdapConfig::default(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub s3: S3Config,
    /// Folder size jobs.
    #[serde(default)]
    pub folder_size: FolderSizeConfig,
    /// LDAP configuration.
    #[serde(default)]
    pub ldap: LdapConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NavError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NavError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `S3NAV_JWT_SECRET`: Override the JWT secret key
    /// - `S3NAV_LDAP_BIND_PASSWORD`: Override the LDAP service account password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("S3NAV_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.web.jwt_secret = jwt_secret;
            }
        }
        if let Ok(password) = std::env::var("S3NAV_LDAP_BIND_PASSWORD") {
            if !password.is_empty() {
                self.ldap.bind_password = password;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is not set
    /// - no bucket is configured, or bucket ids repeat
    /// - LDAP is enabled against a real server without url, search base or bind DN
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(NavError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via S3NAV_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }

        if self.s3.buckets.is_empty() {
            return Err(NavError::Config(
                "No S3 buckets configured. Add [[s3.buckets]] entries.".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for bucket in &self.s3.buckets {
            if bucket.id.trim().is_empty() || bucket.bucket_name.trim().is_empty() {
                return Err(NavError::Config(
                    "Every bucket needs an id and a bucket_name".to_string(),
                ));
            }
            if !ids.insert(bucket.id.as_str()) {
                return Err(NavError::Config(format!(
                    "Duplicate bucket id: {}",
                    bucket.id
                )));
            }
        }

        let ldap = &self.ldap;
        if ldap.enabled && !ldap.embedded.enabled {
            for (name, value) in [
                ("ldap.url", &ldap.url),
                ("ldap.user_search_base", &ldap.user_search_base),
                ("ldap.bind_dn", &ldap.bind_dn),
            ] {
                if value.trim().is_empty() {
                    return Err(NavError::Config(format!("{name} must be configured")));
                }
            }
        }

        Ok(())
    }
}
