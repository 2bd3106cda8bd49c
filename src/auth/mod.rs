//! Authentication for s3nav.
//!
//! Users live in an LDAP directory (or the embedded stand-in); their groups
//! decide between read-only and read-write access.

pub mod access;
pub mod directory;
pub mod embedded;
pub mod ldap;
mod password;
pub mod service;

use thiserror::Error;

pub use access::{resolve_access, AccessLevel};
pub use directory::{Directory, DirectoryUser};
pub use embedded::EmbeddedDirectory;
pub use ldap::LdapDirectory;
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use service::{AuthenticatedUser, UserService};

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown user, wrong or blank password.
    #[error("Invalid username or password")]
    BadCredentials,

    /// Valid credentials but no role and the policy denies.
    #[error("User is not authorized for this application")]
    NotAuthorized,

    /// Directory logins are switched off.
    #[error("LDAP is disabled")]
    Disabled,

    /// The directory could not be queried.
    #[error("directory error: {0}")]
    Directory(String),

    #[error(transparent)]
    Password(#[from] PasswordError),
}
