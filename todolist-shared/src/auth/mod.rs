/// Authentication and authorization
///
/// - `password`: Argon2id password hashing and verification
/// - `jwt`: access/refresh token creation and validation
/// - `middleware`: the authenticated-caller context and its axum extractor
/// - `authorization`: role and ownership checks

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
