// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bootcamp directory API.
//!
//! User registration and session login, plus owner-controlled listings of
//! coding bootcamps with photo uploads.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::PhotoStorage;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub storage: PhotoStorage,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let storage = PhotoStorage::new(config.file_upload_path.clone());
        Self {
            config,
            db,
            storage,
        }
    }
}
