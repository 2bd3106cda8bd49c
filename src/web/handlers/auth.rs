//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::web::dto::{LoginRequest, LoginResponse, UserSession, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser, SESSION_COOKIE};

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// POST /api/auth/login - Authenticate against the directory.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid username or password"),
        (status = 403, description = "User has no role for this application"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let user = state.users.authenticate(&req.username, &req.password).await?;
    let (token, claims) = state.jwt.issue(&user)?;

    let jar = jar.add(session_cookie(token.clone(), state.web_config.secure_cookie));
    let response = LoginResponse {
        username: claims.sub,
        access_level: claims.access_level,
        access_token: token,
        expires_in: state.jwt.expiry_secs(),
    };
    Ok((jar, Json(response)))
}

/// POST /api/auth/logout - End the current session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 204, description = "Logged out"))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(claims): OptionalAuthUser,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    if let Some(claims) = claims {
        state.jwt.revoke(&claims);
        tracing::info!(username = %claims.sub, "User logged out");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

/// GET /api/auth/me - The signed-in user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current session", body = UserSession),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(AuthUser(claims): AuthUser) -> Json<UserSession> {
    Json(UserSession::from(&claims))
}
