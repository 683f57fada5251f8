/// User management endpoints
///
/// All endpoints require authentication. Listing, deletion and role changes
/// are admin-only; reading and updating a profile is allowed for the user
/// themselves or an admin.
///
/// # Endpoints
///
/// - `GET    /api/users` - List all users (admin)
/// - `GET    /api/users/:id` - Get a user (self or admin)
/// - `PUT    /api/users/:id` - Partial profile update (self or admin)
/// - `DELETE /api/users/:id` - Delete a user and their tasks (admin)
/// - `PATCH  /api/users/:id/role` - Change a user's role (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    auth::{
        authorization::{require_admin, require_self_or_admin},
        middleware::AuthContext,
        password,
    },
    models::{
        role::Role,
        user::{UpdateUser, User},
    },
};
use validator::Validate;

/// User payload returned by every user endpoint
///
/// The password hash never appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let roles = user.role_names();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            roles,
        }
    }
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3 and 50 characters"
    ))]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Plaintext replacement password, hashed before storage
    #[validate(length(
        min = 6,
        max = 40,
        message = "Password must be between 6 and 40 characters"
    ))]
    pub password: Option<String>,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// Role name, matched case-insensitively ("admin" or anything else)
    pub role: String,
}

/// Lists all users (admin only)
pub async fn list_users(
    auth: AuthContext,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    require_admin(&auth)?;

    let users = User::list(&state.db).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Gets a user's profile (self or admin)
pub async fn get_user(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    require_self_or_admin(&auth, id)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Applies a partial profile update (self or admin)
///
/// A new username or email must still be unique; collisions respond `409`.
/// A new password is hashed before storage.
///
/// # Errors
///
/// - `404 Not Found`: No such user
/// - `409 Conflict`: Username or email already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    require_self_or_admin(&auth, id)?;
    req.validate()?;

    let password_hash = match req.password {
        Some(ref plaintext) => Some(password::hash_password(plaintext)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Deletes a user and, via cascade, all their tasks (admin only)
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn delete_user(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    let deleted = User::delete(&state.db, id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found".to_string()))
    }
}

/// Changes a user's role (admin only)
///
/// The change takes effect on the target's next request; tokens are not
/// re-issued.
///
/// # Errors
///
/// - `404 Not Found`: No such user
pub async fn update_user_role(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    require_admin(&auth)?;

    let role = Role::from_name(&req.role);

    let user = User::update_role(&state.db, id, role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).expect("Should serialize");

        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"roles\":[\"USER\"]"));
    }

    #[test]
    fn test_update_request_validation() {
        let empty: UpdateUserRequest = serde_json::from_str("{}").expect("Should deserialize");
        assert!(empty.validate().is_ok());

        let bad_email = UpdateUserRequest {
            username: None,
            email: Some("nope".to_string()),
            password: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = UpdateUserRequest {
            username: None,
            email: None,
            password: Some("12345".to_string()),
        };
        assert!(short_password.validate().is_err());
    }
}
