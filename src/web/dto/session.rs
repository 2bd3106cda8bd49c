//! Session DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validation::not_blank;
use crate::auth::AccessLevel;
use crate::web::middleware::JwtClaims;

/// Login request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub username: String,
    pub access_level: AccessLevel,
}

impl From<&JwtClaims> for UserSession {
    fn from(claims: &JwtClaims) -> Self {
        Self {
            username: claims.sub.clone(),
            access_level: claims.access_level,
        }
    }
}

/// Login response: the session plus its bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub username: String,
    pub access_level: AccessLevel,
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}
