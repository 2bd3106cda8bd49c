//! Access levels and their resolution from directory data.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AuthError;
use crate::config::{LdapConfig, NoRolePolicy};

/// What an authenticated user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    ReadOnly,
    ReadWrite,
}

impl AccessLevel {
    /// Only READ_WRITE may modify objects.
    pub fn can_write(&self) -> bool {
        matches!(self, AccessLevel::ReadWrite)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::ReadOnly => "READ_ONLY",
            AccessLevel::ReadWrite => "READ_WRITE",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ_ONLY" => Ok(AccessLevel::ReadOnly),
            "READ_WRITE" => Ok(AccessLevel::ReadWrite),
            other => Err(format!("unknown access level: {other}")),
        }
    }
}

fn contains_ignore_case(candidates: &[String], value: &str) -> bool {
    candidates.iter().any(|c| c.eq_ignore_ascii_case(value))
}

/// Resolve the access level of a user from its group DNs.
///
/// READ_WRITE wins over READ_ONLY; users matching neither fall back to the
/// no-role policy.
pub fn resolve_access(
    username: &str,
    member_of: &[String],
    config: &LdapConfig,
) -> Result<AccessLevel, AuthError> {
    let groups: HashSet<String> = member_of.iter().map(|g| g.to_lowercase()).collect();
    let in_any = |configured: &[String]| {
        configured
            .iter()
            .any(|group| groups.contains(&group.to_lowercase()))
    };

    if in_any(&config.read_write_groups) || contains_ignore_case(&config.read_write_users, username)
    {
        return Ok(AccessLevel::ReadWrite);
    }
    if in_any(&config.read_only_groups) || contains_ignore_case(&config.read_only_users, username) {
        return Ok(AccessLevel::ReadOnly);
    }

    match config.no_role_policy {
        NoRolePolicy::ReadOnly => Ok(AccessLevel::ReadOnly),
        NoRolePolicy::Deny => Err(AuthError::NotAuthorized),
    }
}
