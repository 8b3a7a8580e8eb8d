// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bootcamp listing routes.
//!
//! Reads are public. Every mutation resolves the record first (404 when
//! absent), then checks that the caller owns it (401), then validates
//! input, and only then touches the store or the disk.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Bootcamp, BootcampFilter, BootcampWithCourses};
use crate::routes::SuccessResponse;
use crate::services::storage::photo_filename;
use crate::AppState;

/// Multipart field carrying the photo.
const PHOTO_FIELD: &str = "photo";
/// Room for multipart framing on top of the configured file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Public read routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bootcamps", get(list_bootcamps))
        .route("/bootcamps/{id}", get(get_bootcamp))
}

/// Mutation routes; the caller applies the auth middleware.
pub fn protected_routes(max_upload_size: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/bootcamps", axum::routing::post(create_bootcamp))
        .route(
            "/bootcamps/{id}",
            put(update_bootcamp).delete(delete_bootcamp),
        )
        .route(
            "/bootcamps/{id}/photo",
            put(upload_photo).layer(DefaultBodyLimit::max(
                max_upload_size.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
}

// ─── Reads ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct BootcampListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<BootcampWithCourses>,
}

#[derive(Serialize)]
pub struct BootcampResponse {
    pub success: bool,
    pub data: Bootcamp,
}

/// List bootcamps, filtering on any query parameters, with courses expanded.
async fn list_bootcamps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<BootcampListResponse>> {
    let filter = BootcampFilter::from_query(query);
    let data = state.db.list_bootcamps_with_courses(&filter).await?;

    tracing::debug!(filters = filter.fields.len(), count = data.len(), "Listed bootcamps");

    Ok(Json(BootcampListResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

async fn get_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BootcampResponse>> {
    let bootcamp = state
        .db
        .get_bootcamp(&id)
        .await?
        .ok_or_else(|| AppError::resource_not_found(&id))?;

    Ok(Json(BootcampResponse {
        success: true,
        data: bootcamp,
    }))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcampRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1 to 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    pub description: String,
    #[validate(url(message = "Please use a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub careers: Vec<String>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    #[validate(range(min = 1.0, max = 10.0))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0.0))]
    pub average_cost: Option<f64>,
}

impl CreateBootcampRequest {
    fn into_bootcamp(self, owner: &str) -> Bootcamp {
        Bootcamp {
            id: uuid::Uuid::new_v4().simple().to_string(),
            user: owner.to_string(),
            name: self.name,
            description: self.description,
            website: self.website,
            phone: self.phone,
            email: self.email,
            address: self.address,
            careers: self.careers,
            housing: self.housing,
            job_assistance: self.job_assistance,
            job_guarantee: self.job_guarantee,
            accept_gi: self.accept_gi,
            average_rating: self.average_rating,
            average_cost: self.average_cost,
            photo: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Publish the caller's bootcamp. A user may own at most one.
async fn create_bootcamp(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<CreateBootcampRequest>,
) -> Result<(StatusCode, Json<BootcampResponse>)> {
    // Early rejection only; insert_bootcamp enforces the rule atomically.
    if state
        .db
        .find_bootcamp_by_owner(&caller.user_id)
        .await?
        .is_some()
    {
        tracing::info!(user_id = %caller.user_id, "Rejected second bootcamp for owner");
        return Err(AppError::DuplicateOwner);
    }

    body.validate()?;

    let bootcamp = body.into_bootcamp(&caller.user_id);
    state.db.insert_bootcamp(&bootcamp).await?;

    tracing::info!(
        user_id = %caller.user_id,
        bootcamp_id = %bootcamp.id,
        "Bootcamp created"
    );

    Ok((
        StatusCode::CREATED,
        Json(BootcampResponse {
            success: true,
            data: bootcamp,
        }),
    ))
}

// ─── Update / Delete ─────────────────────────────────────────

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcampRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1 to 50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Description must be 1 to 500 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
    #[validate(range(min = 1.0, max = 10.0))]
    pub average_rating: Option<f64>,
    #[validate(range(min = 0.0))]
    pub average_cost: Option<f64>,
}

impl UpdateBootcampRequest {
    /// Apply the supplied fields. Owner, ID and photo are not client-writable.
    fn apply_to(self, bootcamp: &mut Bootcamp) {
        if let Some(v) = self.name {
            bootcamp.name = v;
        }
        if let Some(v) = self.description {
            bootcamp.description = v;
        }
        if self.website.is_some() {
            bootcamp.website = self.website;
        }
        if self.phone.is_some() {
            bootcamp.phone = self.phone;
        }
        if self.email.is_some() {
            bootcamp.email = self.email;
        }
        if self.address.is_some() {
            bootcamp.address = self.address;
        }
        if let Some(v) = self.careers {
            bootcamp.careers = v;
        }
        if let Some(v) = self.housing {
            bootcamp.housing = v;
        }
        if let Some(v) = self.job_assistance {
            bootcamp.job_assistance = v;
        }
        if let Some(v) = self.job_guarantee {
            bootcamp.job_guarantee = v;
        }
        if let Some(v) = self.accept_gi {
            bootcamp.accept_gi = v;
        }
        if self.average_rating.is_some() {
            bootcamp.average_rating = self.average_rating;
        }
        if self.average_cost.is_some() {
            bootcamp.average_cost = self.average_cost;
        }
    }
}

/// Fetch a bootcamp the caller is allowed to modify.
async fn fetch_owned(state: &AppState, id: &str, caller: &AuthUser) -> Result<Bootcamp> {
    let bootcamp = state
        .db
        .get_bootcamp(id)
        .await?
        .ok_or_else(|| AppError::resource_not_found(id))?;

    if bootcamp.user != caller.user_id {
        tracing::warn!(
            user_id = %caller.user_id,
            bootcamp_id = %id,
            "Rejected modification by non-owner"
        );
        return Err(AppError::Unauthorized);
    }

    Ok(bootcamp)
}

async fn update_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<UpdateBootcampRequest>,
) -> Result<Json<SuccessResponse>> {
    let mut bootcamp = fetch_owned(&state, &id, &caller).await?;

    body.validate()?;
    body.apply_to(&mut bootcamp);
    state.db.save_bootcamp(&bootcamp).await?;

    tracing::info!(bootcamp_id = %id, "Bootcamp updated");

    Ok(Json(SuccessResponse::ok()))
}

async fn delete_bootcamp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<SuccessResponse>> {
    let bootcamp = fetch_owned(&state, &id, &caller).await?;

    let courses_deleted = state.db.delete_bootcamp(&bootcamp).await?;

    tracing::info!(bootcamp_id = %id, courses_deleted, "Bootcamp deleted");

    Ok(Json(SuccessResponse::ok()))
}

// ─── Photo Upload ────────────────────────────────────────────

/// Attach a photo to the caller's bootcamp.
///
/// The file is fully validated, then written to storage, and only then is
/// the record pointed at it. A storage failure leaves the record untouched.
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Extension(caller): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<SuccessResponse>> {
    let mut bootcamp = fetch_owned(&state, &id, &caller).await?;
    let max_size = state.config.file_upload_max_size;

    let mut upload = None;
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        if !content_type.starts_with("image") {
            return Err(AppError::BadRequest("File must be an image".to_string()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > max_size {
                return Err(AppError::BadRequest(format!(
                    "File size must be at most {} bytes",
                    max_size
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((original_name, bytes));
        break;
    }

    let Some((original_name, bytes)) = upload else {
        return Err(AppError::NotFound("No photo found".to_string()));
    };

    let filename = photo_filename(&bootcamp.id, &original_name);
    state.storage.store(&filename, &bytes).await?;

    bootcamp.photo = Some(filename.clone());
    if let Err(e) = state.db.save_bootcamp(&bootcamp).await {
        // Deleted while uploading: nothing references the file any more.
        if matches!(e, AppError::NotFound(_)) {
            if let Err(cleanup) = state.storage.remove(&filename).await {
                tracing::warn!(error = %cleanup, filename = %filename, "Failed to remove orphaned photo");
            }
        }
        return Err(e);
    }

    tracing::info!(
        bootcamp_id = %id,
        filename = %filename,
        size = bytes.len(),
        "Bootcamp photo uploaded"
    );

    Ok(Json(SuccessResponse::ok()))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bootcamp {
        CreateBootcampRequest {
            name: "Devworks".to_string(),
            description: "Full stack".to_string(),
            website: None,
            phone: None,
            email: None,
            address: None,
            careers: vec![],
            housing: false,
            job_assistance: false,
            job_guarantee: false,
            accept_gi: false,
            average_rating: None,
            average_cost: None,
        }
        .into_bootcamp("owner-1")
    }

    #[test]
    fn test_patch_only_touches_supplied_fields() {
        let mut camp = sample();
        let original = camp.clone();

        UpdateBootcampRequest {
            housing: Some(true),
            website: Some("https://devworks.com".to_string()),
            ..Default::default()
        }
        .apply_to(&mut camp);

        assert!(camp.housing);
        assert_eq!(camp.website.as_deref(), Some("https://devworks.com"));
        assert_eq!(camp.name, original.name);
        assert_eq!(camp.user, original.user);
        assert_eq!(camp.id, original.id);
    }

    #[test]
    fn test_create_validation_limits() {
        let body: CreateBootcampRequest = serde_json::from_value(serde_json::json!({
            "name": "x".repeat(51),
            "description": "ok",
        }))
        .unwrap();
        assert!(body.validate().is_err());

        let body: CreateBootcampRequest = serde_json::from_value(serde_json::json!({
            "name": "Devworks",
            "description": "ok",
            "website": "not a url",
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_update_ignores_owner_field() {
        let body: UpdateBootcampRequest =
            serde_json::from_value(serde_json::json!({ "user": "intruder", "name": "New" }))
                .unwrap();
        let mut camp = sample();
        body.apply_to(&mut camp);

        assert_eq!(camp.user, "owner-1");
        assert_eq!(camp.name, "New");
    }
}
