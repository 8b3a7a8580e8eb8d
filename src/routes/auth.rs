// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, logout and the current identity.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::config::MAX_EXPIRE_DAYS;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, TOKEN_COOKIE};
use crate::models::{Role, User};
use crate::routes::SuccessResponse;
use crate::services::password::authenticate;
use crate::AppState;

/// Routes reachable without a session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Routes that need the auth middleware applied by the caller.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(who_am_i))
}

// ─── Register ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Please add a name"))]
    pub name: String,
    #[validate(email(message = "Please add a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Create an account. Does not log the new user in.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<SuccessResponse>> {
    body.validate()?;

    // Argon2 is deliberately slow; keep it off the async workers.
    let user = tokio::task::spawn_blocking(move || {
        User::new(&body.name, &body.email, &body.password, body.role)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    state.db.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");

    Ok(Json(SuccessResponse::ok()))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

/// Check credentials and start a session.
///
/// An unknown email and a wrong password are indistinguishable to the
/// caller: both are a bare 401.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let credentials = state.db.find_credentials_by_email(&body.email).await?;

    // Argon2 runs even for an unknown email so timing does not reveal it.
    let password = body.password;
    let user_id = tokio::task::spawn_blocking(move || authenticate(credentials.as_ref(), &password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .ok_or_else(|| {
            tracing::info!("Login failed");
            AppError::Unauthorized
        })?;

    let token = create_jwt(
        &user_id,
        &state.config.jwt_signing_key,
        state.config.jwt_expire_days,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.production)
        .same_site(SameSite::Lax)
        .expires(
            time::OffsetDateTime::now_utc()
                + time::Duration::days(state.config.cookie_expire_days.clamp(0, MAX_EXPIRE_DAYS)),
        );

    tracing::info!(user_id = %user_id, "User logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            success: true,
            token,
        }),
    ))
}

/// End the browser session by expiring the cookie.
///
/// Tokens are not tracked server-side, so a copied bearer token stays
/// valid until it expires.
async fn logout(jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    let mut cookie = Cookie::from(TOKEN_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Json(SuccessResponse::ok()))
}

// ─── Current User ────────────────────────────────────────────

/// Public view of a user; never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct WhoAmIResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Get the user the session belongs to.
async fn who_am_i(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<WhoAmIResponse>> {
    let user = state
        .db
        .get_user(&caller.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", caller.user_id)))?;

    Ok(Json(WhoAmIResponse {
        success: true,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_body(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "A".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(register_body("a@x.com", "secret123").validate().is_ok());
        assert!(register_body("not-an-email", "secret123").validate().is_err());
        assert!(register_body("a@x.com", "12345").validate().is_err());
    }

    #[test]
    fn test_profile_omits_password_hash() {
        let user = User::new("A", "a@x.com", "secret123", Role::Publisher).unwrap();
        let json = serde_json::to_value(UserProfile::from(user)).unwrap();

        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "publisher");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
