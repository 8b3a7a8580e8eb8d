// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts, plus the `user_emails` uniqueness index)
//! - Bootcamps (listings, plus the `bootcamp_owners` uniqueness index)
//! - Courses (dependent records, removed with their bootcamp)

use crate::db::collections;
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Bootcamp, BootcampFilter, Course, User, UserCredentials};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// `user_emails/{email}` document.
#[derive(Debug, Serialize, Deserialize)]
struct EmailClaim {
    user_id: String,
}

/// `bootcamp_owners/{user_id}` document.
#[derive(Debug, Serialize, Deserialize)]
struct OwnerClaim {
    bootcamp_id: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore Emulator");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client; every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Store a new user, claiming its email first.
    ///
    /// The claim is a create-only write, so two registrations racing for
    /// the same email cannot both succeed.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let client = self.get_client()?;
        let email_id = email_doc_id(&user.email);

        let claimed: std::result::Result<EmailClaim, FirestoreError> = client
            .fluent()
            .insert()
            .into(collections::USER_EMAILS)
            .document_id(&email_id)
            .object(&EmailClaim {
                user_id: user.id.clone(),
            })
            .execute()
            .await;

        match claimed {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => {
                return Err(AppError::Conflict("Email is already registered".to_string()))
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        let written: std::result::Result<(), FirestoreError> = client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await;

        if let Err(e) = written {
            // Release the claim so the email can be registered again.
            if let Err(cleanup) = self.delete_doc(collections::USER_EMAILS, &email_id).await {
                tracing::error!(error = %cleanup, "Failed to release email claim");
            }
            return Err(AppError::Database(e.to_string()));
        }
        Ok(())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up login credentials, reading only the id, email and hash fields.
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let client = self.get_client()?;

        let claim: Option<EmailClaim> = client
            .fluent()
            .select()
            .by_id_in(collections::USER_EMAILS)
            .obj()
            .one(&email_doc_id(email))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let Some(claim) = claim else {
            return Ok(None);
        };

        client
            .fluent()
            .select()
            .fields(["id", "email", "password_hash"])
            .by_id_in(collections::USERS)
            .obj()
            .one(&claim.user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Bootcamp Operations ─────────────────────────────────────

    /// List bootcamps matching every equality filter.
    pub async fn list_bootcamps(&self, filter: &BootcampFilter) -> Result<Vec<Bootcamp>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BOOTCAMPS);

        if filter.is_empty() {
            return query
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        }

        let fields = filter.fields.clone();
        query
            .filter(move |q| {
                let conditions: Vec<_> = fields
                    .iter()
                    .map(|(field, value)| match value {
                        Value::Bool(b) => q.field(field.as_str()).eq(*b),
                        Value::Number(n) => match n.as_i64() {
                            Some(i) => q.field(field.as_str()).eq(i),
                            None => q.field(field.as_str()).eq(n.as_f64().unwrap_or_default()),
                        },
                        other => q
                            .field(field.as_str())
                            .eq(other.as_str().unwrap_or_default().to_string()),
                    })
                    .collect();
                q.for_all(conditions)
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a bootcamp by ID.
    pub async fn get_bootcamp(&self, bootcamp_id: &str) -> Result<Option<Bootcamp>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BOOTCAMPS)
            .obj()
            .one(bootcamp_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the bootcamp owned by a user, if any.
    pub async fn find_bootcamp_by_owner(
        &self,
        user_id: &str,
    ) -> Result<Option<Bootcamp>, AppError> {
        let claim: Option<OwnerClaim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::BOOTCAMP_OWNERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_bootcamp(&claim.bootcamp_id).await,
            None => Ok(None),
        }
    }

    /// Store a new bootcamp after claiming its owner slot.
    ///
    /// Returns [`AppError::DuplicateOwner`] if the owner already has one.
    pub async fn insert_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        let client = self.get_client()?;

        let claimed: std::result::Result<OwnerClaim, FirestoreError> = client
            .fluent()
            .insert()
            .into(collections::BOOTCAMP_OWNERS)
            .document_id(&bootcamp.user)
            .object(&OwnerClaim {
                bootcamp_id: bootcamp.id.clone(),
            })
            .execute()
            .await;

        match claimed {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => return Err(AppError::DuplicateOwner),
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        let written: std::result::Result<(), FirestoreError> = client
            .fluent()
            .update()
            .in_col(collections::BOOTCAMPS)
            .document_id(&bootcamp.id)
            .object(bootcamp)
            .execute()
            .await;

        if let Err(e) = written {
            if let Err(cleanup) = self
                .delete_doc(collections::BOOTCAMP_OWNERS, &bootcamp.user)
                .await
            {
                tracing::error!(error = %cleanup, "Failed to release owner claim");
            }
            return Err(AppError::Database(e.to_string()));
        }
        Ok(())
    }

    /// Overwrite an existing bootcamp document.
    ///
    /// The write carries an `exists` precondition, so a bootcamp deleted
    /// since it was read is reported as not found instead of recreated
    /// without its owner claim.
    pub async fn save_bootcamp(&self, bootcamp: &Bootcamp) -> Result<(), AppError> {
        let written: std::result::Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BOOTCAMPS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(&bootcamp.id)
            .object(bootcamp)
            .execute()
            .await;

        match written {
            Ok(()) => Ok(()),
            Err(FirestoreError::DataNotFoundError(_)) => {
                Err(AppError::resource_not_found(&bootcamp.id))
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Delete a bootcamp together with its courses and owner claim.
    ///
    /// Returns the number of courses deleted.
    pub async fn delete_bootcamp(&self, bootcamp: &Bootcamp) -> Result<usize, AppError> {
        let client = self.get_client()?;

        let courses = self.courses_for_bootcamp(&bootcamp.id).await?;
        self.batch_delete(&courses, collections::COURSES, |c: &Course| c.id.clone())
            .await?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::BOOTCAMPS)
            .document_id(&bootcamp.id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(collections::BOOTCAMP_OWNERS)
            .document_id(&bootcamp.user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(e.to_string()))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(courses.len())
    }

    // ─── Course Operations ───────────────────────────────────────

    /// Store a course.
    pub async fn insert_course(&self, course: &Course) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COURSES)
            .document_id(&course.id)
            .object(course)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all courses of a bootcamp.
    pub async fn courses_for_bootcamp(&self, bootcamp_id: &str) -> Result<Vec<Course>, AppError> {
        let bootcamp_id = bootcamp_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COURSES)
            .filter(move |q| q.for_all([q.field("bootcamp").eq(bootcamp_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    async fn delete_doc(&self, collection: &str, doc_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id_extractor(item))
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Document ID of an email claim. Emails may contain `/`, which Firestore
/// forbids in IDs.
fn email_doc_id(email: &str) -> String {
    urlencoding::encode(&normalize_email(email)).into_owned()
}
