//! Login against the configured directory.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::access::{resolve_access, AccessLevel};
use super::directory::Directory;
use super::embedded::EmbeddedDirectory;
use super::ldap::LdapDirectory;
use super::AuthError;
use crate::config::LdapConfig;

/// A user that passed authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub dn: String,
    pub access_level: AccessLevel,
}

/// Authenticates users and resolves their access level.
pub struct UserService {
    config: LdapConfig,
    directory: Arc<dyn Directory>,
}

impl UserService {
    /// The embedded directory when enabled, otherwise the LDAP server.
    pub fn from_config(config: &LdapConfig) -> Self {
        let directory: Arc<dyn Directory> = if config.embedded.enabled {
            info!(
                users = config.embedded.users.len(),
                "Using embedded user directory"
            );
            Arc::new(EmbeddedDirectory::new(config))
        } else {
            info!(url = %config.url, "Using LDAP directory");
            Arc::new(LdapDirectory::new(config.clone()))
        };
        Self::new(config.clone(), directory)
    }

    pub fn new(config: LdapConfig, directory: Arc<dyn Directory>) -> Self {
        Self { config, directory }
    }

    /// Check credentials and resolve the access level.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        if !self.config.enabled {
            return Err(AuthError::Disabled);
        }
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::BadCredentials);
        }

        let user = self
            .directory
            .find_user(username.trim())
            .await?
            .ok_or_else(|| {
                debug!(username, "User not found");
                AuthError::BadCredentials
            })?;

        if !self.directory.verify_password(&user, password).await? {
            warn!(username = %user.username, "Login failed: bad password");
            return Err(AuthError::BadCredentials);
        }

        let access_level = resolve_access(&user.username, &user.member_of, &self.config)
            .inspect_err(|_| {
                warn!(username = %user.username, "Login refused: no role");
            })?;

        info!(username = %user.username, access = %access_level, "User authenticated");
        Ok(AuthenticatedUser {
            username: user.username,
            dn: user.dn,
            access_level,
        })
    }
}
