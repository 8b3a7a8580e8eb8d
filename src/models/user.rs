// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Serialize};

use crate::services::password::hash_password;

/// Account role. Only roles a user may pick at registration exist here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
}

/// User record stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Generated user ID (also used as document ID)
    pub id: String,
    pub name: String,
    /// Unique, compared case-insensitively
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Argon2 PHC string; the plaintext is never stored
    pub password_hash: String,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

impl User {
    /// Build a new user, hashing `password` on the way in.
    ///
    /// This is the only constructor that takes a plaintext password.
    pub fn new(name: &str, email: &str, password: &str, role: Role) -> anyhow::Result<Self> {
        Ok(Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            role,
            password_hash: hash_password(password)?,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Login projection of a user: only what credential checks need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

impl From<&User> for UserCredentials {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
        }
    }
}

/// Canonical form used for storage and uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
