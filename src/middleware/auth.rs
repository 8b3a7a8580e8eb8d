// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session authentication middleware.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie set at login.
pub const TOKEN_COOKIE: &str = "token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated caller extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(t) => t.to_string(),
            None => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let claims = decode_jwt(&token, &state.config.jwt_signing_key).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        StatusCode::UNAUTHORIZED
    })?;

    if claims.sub.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

/// Create a session JWT for a user, valid for `expire_days`.
pub fn create_jwt(user_id: &str, signing_key: &[u8], expire_days: i64) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
    let exp = usize::try_from(expire_days.max(0))?
        .checked_mul(24 * 60 * 60)
        .and_then(|lifetime| now.checked_add(lifetime))
        .ok_or_else(|| anyhow::anyhow!("Token lifetime of {} days is out of range", expire_days))?;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify signature and expiry of a session JWT.
pub fn decode_jwt(token: &str, signing_key: &[u8]) -> jsonwebtoken::errors::Result<Claims> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_jwt_roundtrip_keeps_user_id() {
        let token = create_jwt("65f0c0ffee", KEY, 30).unwrap();
        let claims = decode_jwt(&token, KEY).unwrap();

        assert_eq!(claims.sub, "65f0c0ffee");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_jwt_wrong_key_rejected() {
        let token = create_jwt("u1", KEY, 1).unwrap();
        assert!(decode_jwt(&token, b"another_key_of_sufficient_len!!").is_err());
    }

    #[test]
    fn test_jwt_huge_lifetime_is_an_error() {
        assert!(create_jwt("u1", KEY, i64::MAX).is_err());
        assert!(create_jwt("u1", KEY, i64::MAX / 86_400).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Default validation leeway is 60s, so back-date beyond it.
        use jsonwebtoken::{encode, EncodingKey, Header};
        let claims = Claims {
            sub: "u1".to_string(),
            iat: 1,
            exp: 2,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(KEY))
            .unwrap();
        assert!(decode_jwt(&token, KEY).is_err());
    }
}
