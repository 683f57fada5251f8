/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Register a new user
/// - `POST /api/auth/signin` - Login and get tokens
/// - `POST /api/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use todolist_shared::{
    auth::{jwt, password},
    models::{
        role::Role,
        user::{CreateUser, User},
    },
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Username (unique)
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: String,

    /// Email address (unique)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(
        min = 6,
        max = 40,
        message = "Password must be between 6 and 40 characters"
    ))]
    pub password: String,

    /// Requested role names; omitted or empty means a regular user
    pub role: Option<HashSet<String>>,
}

/// User payload returned by signup
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

/// Signin request
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Signin response
#[derive(Debug, Serialize, Deserialize)]
pub struct SigninResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Resolves requested role names to the account role
///
/// Any name matching "admin" (case-insensitive) grants the admin role;
/// anything else, or no names at all, yields a regular user.
fn resolve_role(names: Option<&HashSet<String>>) -> Role {
    match names {
        Some(names) if names.iter().any(|n| Role::from_name(n).is_admin()) => Role::Admin,
        _ => Role::User,
    }
}

/// Register a new user
///
/// # Errors
///
/// - `409 Conflict`: Username or email already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    req.validate()?;

    if User::exists_by_username(&state.db, &req.username).await? {
        return Err(ApiError::Conflict("Username is already taken".to_string()));
    }
    if User::exists_by_email(&state.db, &req.email).await? {
        return Err(ApiError::Conflict("Email is already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let role = resolve_role(req.role.as_ref());

    // Unique constraints backstop the existence checks against races;
    // a losing insert surfaces as 409 via the sqlx error mapping
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            role,
        },
    )
    .await?;

    let roles = user.role_names();
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            roles,
        }),
    ))
}

/// Login endpoint
///
/// Authenticates by username and password and returns JWT tokens. Unknown
/// usernames and wrong passwords produce the same response, so callers
/// cannot probe for which usernames exist.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<Json<SigninResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = jwt::create_token(user.id, jwt::TokenType::Access, state.jwt_secret())?;
    let refresh_token = jwt::create_token(user.id, jwt::TokenType::Refresh, state.jwt_secret())?;

    let roles = user.role_names();
    Ok(Json(SigninResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        roles,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_role_default() {
        assert_eq!(resolve_role(None), Role::User);
        assert_eq!(resolve_role(Some(&HashSet::new())), Role::User);
    }

    #[test]
    fn test_resolve_role_admin() {
        assert_eq!(resolve_role(Some(&names(&["admin"]))), Role::Admin);
        assert_eq!(resolve_role(Some(&names(&["ADMIN"]))), Role::Admin);
        assert_eq!(resolve_role(Some(&names(&["user", "admin"]))), Role::Admin);
    }

    #[test]
    fn test_resolve_role_unknown_names_default_to_user() {
        assert_eq!(resolve_role(Some(&names(&["user"]))), Role::User);
        assert_eq!(resolve_role(Some(&names(&["moderator"]))), Role::User);
    }

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
            role: None,
        };
        assert!(valid.validate().is_ok());

        let short_username = SignupRequest {
            username: "ab".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret123".to_string(),
            role: None,
        };
        assert!(short_username.validate().is_err());

        let bad_email = SignupRequest {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            role: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "12345".to_string(),
            role: None,
        };
        assert!(short_password.validate().is_err());
    }
}
