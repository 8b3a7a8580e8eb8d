// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); otherwise they are skipped.

use bootcamp_api::error::AppError;
use bootcamp_api::models::{Bootcamp, BootcampFilter, Course, Role, User};
use std::collections::HashMap;

mod common;
use common::test_db;

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

fn test_bootcamp(owner: &str) -> Bootcamp {
    Bootcamp {
        id: unique("camp"),
        user: owner.to_string(),
        name: "Emulated Camp".to_string(),
        description: "Runs against the emulator".to_string(),
        website: None,
        phone: None,
        email: None,
        address: None,
        careers: vec!["Web Development".to_string()],
        housing: true,
        job_assistance: false,
        job_guarantee: false,
        accept_gi: false,
        average_rating: None,
        average_cost: Some(5000.0),
        photo: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_insert_and_credentials_lookup() {
    require_emulator!();

    let db = test_db().await;
    let email = format!("{}@example.com", unique("user"));
    let user = User::new("Emu", &email, "secret123", Role::Publisher).unwrap();

    db.insert_user(&user).await.unwrap();

    let stored = db.get_user(&user.id).await.unwrap().expect("user stored");
    assert_eq!(stored.email, email);
    assert_eq!(stored.role, Role::Publisher);

    let credentials = db
        .find_credentials_by_email(&email.to_uppercase())
        .await
        .unwrap()
        .expect("credentials found");
    assert_eq!(credentials.id, user.id);
    assert_eq!(credentials.password_hash, user.password_hash);

    let twin = User::new("Twin", &email, "secret456", Role::User).unwrap();
    let err = db.insert_user(&twin).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// ═══════════════════════════════════════════════════════════════════════════
// BOOTCAMP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_bootcamp_owner_uniqueness_and_cascade() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique("owner");
    let camp = test_bootcamp(&owner);

    db.insert_bootcamp(&camp).await.unwrap();
    let err = db.insert_bootcamp(&test_bootcamp(&owner)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateOwner));

    let found = db.find_bootcamp_by_owner(&owner).await.unwrap();
    assert_eq!(found.map(|b| b.id), Some(camp.id.clone()));

    db.insert_course(&Course {
        id: unique("course"),
        bootcamp: camp.id.clone(),
        user: owner.clone(),
        title: "Rust".to_string(),
        description: "Ownership".to_string(),
        weeks: 4,
        tuition: 1000.0,
        minimum_skill: "beginner".to_string(),
        scholarship_available: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
    .await
    .unwrap();

    let deleted = db.delete_bootcamp(&camp).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(db.get_bootcamp(&camp.id).await.unwrap().is_none());
    assert!(db.courses_for_bootcamp(&camp.id).await.unwrap().is_empty());
    assert!(db.find_bootcamp_by_owner(&owner).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bootcamp_list_filters() {
    require_emulator!();

    let db = test_db().await;
    let camp = test_bootcamp(&unique("owner"));
    db.insert_bootcamp(&camp).await.unwrap();

    let filter = BootcampFilter::from_query(HashMap::from([
        ("name".to_string(), "Emulated Camp".to_string()),
        ("housing".to_string(), "true".to_string()),
    ]));
    let listed = db.list_bootcamps(&filter).await.unwrap();
    assert!(listed.iter().any(|b| b.id == camp.id));

    let filter = BootcampFilter::from_query(HashMap::from([(
        "name".to_string(),
        unique("nothing"),
    )]));
    assert!(db.list_bootcamps(&filter).await.unwrap().is_empty());

    db.delete_bootcamp(&camp).await.unwrap();
}
