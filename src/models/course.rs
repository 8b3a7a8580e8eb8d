// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Course model: dependent records of a bootcamp.

use serde::{Deserialize, Serialize};

/// Course stored in the `courses` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    /// Parent bootcamp ID; courses are removed with their bootcamp
    pub bootcamp: String,
    /// Owning user ID
    pub user: String,
    pub title: String,
    pub description: String,
    pub weeks: u32,
    pub tuition: f64,
    pub minimum_skill: String,
    #[serde(default)]
    pub scholarship_available: bool,
    pub created_at: String,
}
