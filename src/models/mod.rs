// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod bootcamp;
pub mod course;
pub mod user;

pub use bootcamp::{Bootcamp, BootcampFilter, BootcampWithCourses};
pub use course::Course;
pub use user::{Role, User, UserCredentials};
