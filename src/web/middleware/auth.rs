//! JWT session middleware.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::auth::{AccessLevel, AuthenticatedUser};
use crate::web::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "s3nav_session";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (username).
    pub sub: String,
    pub access_level: AccessLevel,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

impl JwtClaims {
    pub fn can_write(&self) -> bool {
        self.access_level.can_write()
    }
}

/// Signing keys and the set of revoked sessions.
pub struct JwtState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
    /// Revoked token ids with their expiry.
    revoked: RwLock<HashMap<String, u64>>,
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Sign a session token for `user`.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<(String, JwtClaims), ApiError> {
        let now = now_secs();
        let claims = JwtClaims {
            sub: user.username.clone(),
            access_level: user.access_level,
            iat: now,
            exp: now + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to create session")
        })?;
        Ok((token, claims))
    }

    /// Decode a token and reject expired or revoked sessions.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired session")
            })?
            .claims;

        if self.is_revoked(&claims.jti) {
            return Err(ApiError::unauthorized("Session has been logged out"));
        }
        Ok(claims)
    }

    /// Revoke a session until it would have expired anyway.
    pub fn revoke(&self, claims: &JwtClaims) {
        let mut revoked = self
            .revoked
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = now_secs();
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }

    fn is_revoked(&self, jti: &str) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(jti)
    }
}

/// Session token from the `Authorization` header, the session cookie or the
/// `token` query parameter, in that order.
fn session_token(parts: &Parts) -> Option<String> {
    if let Some(bearer) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(bearer.trim().to_string());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    // WebSocket clients cannot set headers
    parts.uri.query().and_then(|query| {
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == "token" {
                urlencoding::decode(value).ok().map(|s| s.into_owned())
            } else {
                None
            }
        })
    })
}

fn jwt_state(parts: &Parts) -> Result<&Arc<JwtState>, ApiError> {
    parts
        .extensions
        .get::<Arc<JwtState>>()
        .ok_or_else(|| ApiError::internal("JWT state not configured"))
}

/// Extractor for authenticated users.
///
/// Use this extractor to require authentication for a handler.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token =
            session_token(parts).ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        let claims = jwt_state(parts)?.verify(&token)?;
        Ok(AuthUser(claims))
    }
}

/// Extractor for users allowed to modify objects.
#[derive(Debug, Clone)]
pub struct WriteUser(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for WriteUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.can_write() {
            tracing::debug!(username = %claims.sub, "Write refused for read-only user");
            return Err(ApiError::forbidden("Read-write access required"));
        }
        Ok(WriteUser(claims))
    }
}

/// Optional authentication extractor.
///
/// Similar to AuthUser but doesn't fail if no valid session is present.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<JwtClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(OptionalAuthUser(None));
        };
        let Ok(state) = jwt_state(parts) else {
            return Ok(OptionalAuthUser(None));
        };
        Ok(OptionalAuthUser(state.verify(&token).ok()))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
