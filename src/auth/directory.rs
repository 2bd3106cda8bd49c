//! User directory abstraction.

use async_trait::async_trait;

use super::AuthError;

/// A user entry found in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Canonical username from the directory.
    pub username: String,
    /// Distinguished name used to bind as the user.
    pub dn: String,
    /// Group DNs from `memberOf`.
    pub member_of: Vec<String>,
}

/// Where users and their groups come from.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up a user by login name.
    async fn find_user(&self, username: &str) -> Result<Option<DirectoryUser>, AuthError>;

    /// Whether `password` is valid for `user`.
    async fn verify_password(&self, user: &DirectoryUser, password: &str)
        -> Result<bool, AuthError>;
}
