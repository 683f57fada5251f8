/// Authenticated-caller context for request handlers
///
/// The API layer validates the bearer token, loads the user, and inserts an
/// [`AuthContext`] into request extensions. Handlers receive it through the
/// `FromRequestParts` extractor:
///
/// ```ignore
/// async fn list_tasks(auth: AuthContext, State(state): State<AppState>) { ... }
/// ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::role::Role;

/// Error type for authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header present
    #[error("Missing authentication credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("Invalid authorization header format")]
    InvalidFormat,

    /// Token failed validation
    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "Unauthorized",
            "message": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// The authenticated caller of the current request
///
/// Role is loaded from the database on every request, so a role change takes
/// effect on the user's next call without re-issuing tokens.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Id of the authenticated user
    pub user_id: i64,
    /// The user's current role
    pub role: Role,
}

impl AuthContext {
    /// Returns true if the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Role names for inclusion in wire responses
    pub fn role_names(&self) -> Vec<String> {
        vec![self.role.as_str().to_string()]
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header_value: &str) -> Result<&str, AuthError> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}
