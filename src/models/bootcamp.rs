// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bootcamp listing model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::Course;

/// Bootcamp listing stored in the `bootcamps` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    /// Generated ID (also used as document ID)
    pub id: String,
    /// Owning user ID
    pub user: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
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
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_cost: Option<f64>,
    /// Stored photo file name, set by a successful upload
    #[serde(default)]
    pub photo: Option<String>,
    pub created_at: String,
}

/// A bootcamp with its courses expanded, as returned by the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BootcampWithCourses {
    #[serde(flatten)]
    pub bootcamp: Bootcamp,
    pub courses: Vec<Course>,
}

/// Stored bootcamp fields a list query may filter on.
pub const FILTERABLE_FIELDS: &[&str] = &[
    "id",
    "user",
    "name",
    "description",
    "website",
    "phone",
    "email",
    "address",
    "careers",
    "housing",
    "jobAssistance",
    "jobGuarantee",
    "acceptGi",
    "averageRating",
    "averageCost",
    "photo",
    "createdAt",
];

/// Equality filters taken from a query string.
///
/// Keys that are not bootcamp fields are dropped, so every store sees the
/// same filter. Values are typed loosely: `true`/`false` become booleans, numeric strings
/// become numbers, everything else stays a string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootcampFilter {
    pub fields: Vec<(String, Value)>,
}

impl BootcampFilter {
    pub fn from_query(query: HashMap<String, String>) -> Self {
        let mut fields: Vec<(String, Value)> = query
            .into_iter()
            .filter(|(field, _)| {
                let known = FILTERABLE_FIELDS.contains(&field.as_str());
                if !known {
                    tracing::debug!(field = %field, "Ignoring unknown filter key");
                }
                known
            })
            .map(|(field, raw)| (field, parse_filter_value(&raw)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a bootcamp satisfies every filter.
    ///
    /// Used by the in-memory store; Firestore evaluates the same filters
    /// server-side. A missing field never matches.
    pub fn matches(&self, bootcamp: &Bootcamp) -> bool {
        let Ok(Value::Object(doc)) = serde_json::to_value(bootcamp) else {
            return false;
        };
        self.fields
            .iter()
            .all(|(field, expected)| doc.get(field).is_some_and(|v| values_equal(v, expected)))
    }
}

fn parse_filter_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::from(n)
            } else if let Some(n) = raw.parse::<f64>().ok().filter(|n| n.is_finite()) {
                Value::from(n)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

// 5 and 5.0 are the same filter value.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}
