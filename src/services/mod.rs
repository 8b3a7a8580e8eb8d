// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - password hashing and photo storage.

pub mod password;
pub mod storage;

pub use storage::{photo_filename, PhotoStorage};
