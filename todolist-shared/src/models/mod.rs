/// Database models for the todolist backend
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `role`: The `USER`/`ADMIN` role tag
/// - `user`: User accounts and authentication data
/// - `task`: Tasks owned by users

pub mod role;
pub mod task;
pub mod user;
