// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Db`] is the handle the routes use. It forwards every operation to the
//! configured backend: Firestore in production, or an in-memory store for
//! local development and tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::config::{Config, StoreBackend};
use crate::error::AppError;
use crate::models::{
    Bootcamp, BootcampFilter, BootcampWithCourses, Course, User, UserCredentials,
};
use futures_util::{stream, StreamExt, TryStreamExt};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email uniqueness index (keyed by normalized, URL-encoded email)
    pub const USER_EMAILS: &str = "user_emails";
    pub const BOOTCAMPS: &str = "bootcamps";
    /// Owner uniqueness index (keyed by user ID)
    pub const BOOTCAMP_OWNERS: &str = "bootcamp_owners";
    pub const COURSES: &str = "courses";
}

const MAX_CONCURRENT_DB_OPS: usize = 16;

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Db::Firestore(db) => db.$method($($arg),*).await,
            Db::Memory(db) => db.$method($($arg),*).await,
        }
    };
}

/// Store handle shared by all requests.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    /// Open the backend selected by the configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Firestore => Ok(Db::Firestore(
                FirestoreDb::new(&config.gcp_project_id).await?,
            )),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Db::Memory(MemoryDb::new()))
            }
        }
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        dispatch!(self.insert_user(user))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        dispatch!(self.get_user(user_id))
    }

    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        dispatch!(self.find_credentials_by_email(email))
    }

    pub async fn list_bootcamps(&self, filter: &BootcampFilter) -> Result<Vec<Bootcamp>, AppError> {
        dispatch!(self.list_bootcamps(filter))
    }

    /// List bootcamps with their courses expanded, in listing order.
    pub async fn list_bootcamps_with_courses(
        &self,
        filter: &BootcampFilter,
    ) -> Result<Vec<BootcampWithCourses>, AppError> {
        let bootcamps = self.list_bootcamps(filter).await?;

        stream::iter(bootcamps)
            .map(|bootcamp| async move {
                let courses = self.courses_for_bootcamp(&bootcamp.id).await?;
                Ok::<_, AppError>(BootcampWithCourses { bootcamp, courses })
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .try_collect()
            .await
    }

    pub async fn get_bootcamp(&self, bootcamp_id: &str) -> Result<Option<Bootcamp>, AppError> {
        dispatch!(self.get_bootcamp(bootcamp_id))
    }

    pub async fn find_bootcamp_by_owner(
        &self,
        user_id: &str,
    ) -> Result<Option<Bootcamp>, AppError> {
        dispatch!(self.find_bootcamp_by_owner(user_id))
    }

    /// Insert a bootcamp; the store rejects a second one per owner.
    pub async fn insert_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        dispatch!(self.insert_bootcamp(bootcamp))
    }

    pub async fn save_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        dispatch!(self.save_bootcamp(bootcamp))
    }

    /// Delete a bootcamp and its courses, freeing the owner's slot.
    pub async fn delete_bootcamp(&self, bootcamp: &Bootcamp) -> Result<usize, AppError> {
        dispatch!(self.delete_bootcamp(bootcamp))
    }

    pub async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        dispatch!(self.insert_course(course))
    }

    pub async fn courses_for_bootcamp(&self, bootcamp_id: &str) -> Result<Vec<Course>, AppError> {
        dispatch!(self.courses_for_bootcamp(bootcamp_id))
    }
}
