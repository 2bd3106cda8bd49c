//! Directory of users declared in the configuration file.

use async_trait::async_trait;

use super::directory::{Directory, DirectoryUser};
use super::password::{verify_password, PasswordError};
use super::AuthError;
use crate::config::{EmbeddedUser, LdapConfig};

/// Local-development stand-in for an LDAP server.
pub struct EmbeddedDirectory {
    users: Vec<EmbeddedUser>,
    user_search_base: String,
}

impl EmbeddedDirectory {
    pub fn new(config: &LdapConfig) -> Self {
        Self {
            users: config.embedded.users.clone(),
            user_search_base: config.user_search_base.clone(),
        }
    }

    fn lookup(&self, username: &str) -> Option<&EmbeddedUser> {
        self.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
    }
}

#[async_trait]
impl Directory for EmbeddedDirectory {
    async fn find_user(&self, username: &str) -> Result<Option<DirectoryUser>, AuthError> {
        Ok(self.lookup(username).map(|user| DirectoryUser {
            username: user.username.clone(),
            dn: format!("uid={},{}", user.username, self.user_search_base),
            member_of: user.member_of.clone(),
        }))
    }

    async fn verify_password(
        &self,
        user: &DirectoryUser,
        password: &str,
    ) -> Result<bool, AuthError> {
        let Some(entry) = self.lookup(&user.username) else {
            return Ok(false);
        };
        let hash = entry.password_hash.clone();
        let password = password.to_string();

        // Argon2 verification blocks for a while.
        let outcome = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Directory(e.to_string()))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(PasswordError::VerificationFailed) => Ok(false),
            Err(e) => Err(AuthError::Password(e)),
        }
    }
}
