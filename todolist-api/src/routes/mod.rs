/// API route handlers
///
/// - `health`: Public health check
/// - `auth`: Signup, signin and token refresh
/// - `tasks`: Task CRUD, completion toggle, overdue and per-user listings
/// - `users`: User administration and profile updates

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
