// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore collections with one map per collection. The
//! uniqueness indexes are claimed through `DashMap::entry`, which holds the
//! shard lock across check and insert.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Bootcamp, BootcampFilter, Course, User, UserCredentials};

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    /// Normalized email -> user ID
    user_emails: DashMap<String, String>,
    bootcamps: DashMap<String, Bootcamp>,
    /// Owner user ID -> bootcamp ID
    bootcamp_owners: DashMap<String, String>,
    courses: DashMap<String, Course>,
}

/// In-memory database; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.inner.user_emails.entry(normalize_email(&user.email)) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "Email is already registered".to_string(),
            )),
            Entry::Vacant(slot) => {
                self.inner.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(())
            }
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.inner.users.get(user_id).map(|u| u.clone()))
    }

    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let Some(user_id) = self
            .inner
            .user_emails
            .get(&normalize_email(email))
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        Ok(self
            .inner
            .users
            .get(&user_id)
            .map(|u| UserCredentials::from(&*u)))
    }

    // ─── Bootcamp Operations ─────────────────────────────────────

    pub async fn list_bootcamps(&self, filter: &BootcampFilter) -> Result<Vec<Bootcamp>, AppError> {
        let mut bootcamps: Vec<Bootcamp> = self
            .inner
            .bootcamps
            .iter()
            .filter(|b| filter.matches(b.value()))
            .map(|b| b.value().clone())
            .collect();
        // Map iteration order is arbitrary; keep listings stable.
        bootcamps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(bootcamps)
    }

    pub async fn get_bootcamp(&self, bootcamp_id: &str) -> Result<Option<Bootcamp>, AppError> {
        Ok(self.inner.bootcamps.get(bootcamp_id).map(|b| b.clone()))
    }

    pub async fn find_bootcamp_by_owner(
        &self,
        user_id: &str,
    ) -> Result<Option<Bootcamp>, AppError> {
        let Some(bootcamp_id) = self
            .inner
            .bootcamp_owners
            .get(user_id)
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        self.get_bootcamp(&bootcamp_id).await
    }

    pub async fn insert_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        match self.inner.bootcamp_owners.entry(bootcamp.user.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateOwner),
            Entry::Vacant(slot) => {
                self.inner
                    .bootcamps
                    .insert(bootcamp.id.clone(), bootcamp.clone());
                slot.insert(bootcamp.id.clone());
                Ok(())
            }
        }
    }

    /// Overwrite an existing bootcamp; a deleted one is never recreated.
    pub async fn save_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        match self.inner.bootcamps.get_mut(&bootcamp.id) {
            Some(mut stored) => {
                *stored = bootcamp.clone();
                Ok(())
            }
            None => Err(AppError::resource_not_found(&bootcamp.id)),
        }
    }

    pub async fn delete_bootcamp(&self, bootcamp: &Bootcamp) -> Result<usize, AppError> {
        let before = self.inner.courses.len();
        self.inner
            .courses
            .retain(|_, course| course.bootcamp != bootcamp.id);
        let courses_deleted = before.saturating_sub(self.inner.courses.len());

        self.inner.bootcamps.remove(&bootcamp.id);
        self.inner
            .bootcamp_owners
            .remove_if(&bootcamp.user, |_, owned| owned == &bootcamp.id);

        Ok(courses_deleted)
    }

    // ─── Course Operations ───────────────────────────────────────

    pub async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        self.inner.courses.insert(course.id.clone(), course.clone());
        Ok(())
    }

    pub async fn courses_for_bootcamp(&self, bootcamp_id: &str) -> Result<Vec<Course>, AppError> {
        let mut courses: Vec<Course> = self
            .inner
            .courses
            .iter()
            .filter(|c| c.bootcamp == bootcamp_id)
            .map(|c| c.value().clone())
            .collect();
        courses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(courses)
    }
}
