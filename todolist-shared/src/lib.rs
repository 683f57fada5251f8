//! # Todolist Shared Library
//!
//! Shared types and business logic used by the todolist API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, and authorization helpers
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the todolist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
