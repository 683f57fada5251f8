/// Task management endpoints
///
/// All endpoints require authentication. Regular users operate on their own
/// tasks; admins operate on everyone's. A task outside the caller's scope
/// responds `404 Not Found`, never `403`: the API does not reveal whether a
/// foreign task ID exists.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List own tasks (admins: all), `?completed=` filter
/// - `POST   /api/tasks` - Create a task owned by the caller
/// - `GET    /api/tasks/overdue` - List own incomplete tasks past their due date
/// - `GET    /api/tasks/:id` - Get a task
/// - `PUT    /api/tasks/:id` - Replace a task's fields
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `PATCH  /api/tasks/:id/complete` - Toggle completion
/// - `GET    /api/tasks/user/:user_id` - List a user's tasks (self or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use todolist_shared::{
    auth::{
        authorization::{ownership_scope, require_self_or_admin},
        middleware::AuthContext,
    },
    models::task::{Task, TaskFields},
};
use validator::{Validate, ValidationError};

/// Request body shared by create and update
///
/// Update replaces every field with the body's values, so a single DTO (and
/// a single set of validation rules) covers both writes. The owner is never
/// part of the body: create forces it to the caller, update leaves it alone.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// Task title, non-blank, at most 100 characters
    #[validate(
        length(max = 100, message = "Title must be at most 100 characters"),
        custom(function = validate_title_not_blank)
    )]
    pub title: String,

    /// Optional description, at most 500 characters
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Completion flag; defaults to false when omitted
    #[serde(default)]
    pub completed: bool,

    /// Optional due date (ISO 8601 date); must not be in the past
    #[validate(custom(function = validate_due_date_not_past))]
    pub due_date: Option<NaiveDate>,
}

impl TaskRequest {
    fn into_fields(self) -> TaskFields {
        TaskFields {
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date: self.due_date,
        }
    }
}

/// Query parameters for task listing
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Filter by completion state; absent means no filter
    pub completed: Option<bool>,
}

fn validate_title_not_blank(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("title_blank");
        err.message = Some("Title must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Rejects dates strictly before today (UTC). Today itself is allowed.
fn validate_due_date_not_past(due_date: &NaiveDate) -> Result<(), ValidationError> {
    if *due_date < Utc::now().date_naive() {
        let mut err = ValidationError::new("due_date_past");
        err.message = Some("Due date must not be in the past".into());
        return Err(err);
    }
    Ok(())
}

/// Lists the caller's tasks, newest first
///
/// Admins see every user's tasks. `?completed=true|false` filters on the
/// completion flag.
pub async fn list_tasks(
    auth: AuthContext,
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list(&state.db, ownership_scope(&auth), query.completed).await?;
    Ok(Json(tasks))
}

/// Lists the caller's incomplete tasks whose due date has passed
pub async fn list_overdue_tasks(
    auth: AuthContext,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_overdue(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

/// Lists a specific user's tasks
///
/// The caller must be that user or an admin; anyone else gets `403`.
pub async fn list_tasks_by_user(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    require_self_or_admin(&auth, user_id)?;

    let tasks = Task::list(&state.db, Some(user_id), None).await?;
    Ok(Json(tasks))
}

/// Gets a single task
///
/// # Errors
///
/// - `404 Not Found`: No such task in the caller's scope
pub async fn get_task(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find(&state.db, id, ownership_scope(&auth))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Creates a task owned by the caller
///
/// Ownership is taken from the authenticated caller, for admins too; the
/// request body cannot assign a task to someone else.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    auth: AuthContext,
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = Task::create(&state.db, auth.user_id, req.into_fields()).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Replaces a task's fields
///
/// # Errors
///
/// - `404 Not Found`: No such task in the caller's scope
/// - `422 Unprocessable Entity`: Validation failed (nothing is persisted)
pub async fn update_task(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = Task::update(&state.db, id, ownership_scope(&auth), req.into_fields())
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Toggles a task's completion flag
///
/// The flip is computed server-side, so the response always reflects the
/// stored state even under concurrent toggles.
pub async fn toggle_task_completed(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::toggle_completed(&state.db, id, ownership_scope(&auth))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Deletes a task
///
/// # Errors
///
/// - `404 Not Found`: No such task in the caller's scope (including a repeat
///   of an already-completed delete)
pub async fn delete_task(
    auth: AuthContext,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, id, ownership_scope(&auth)).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Task not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_request() -> TaskRequest {
        TaskRequest {
            title: "Buy milk".to_string(),
            description: Some("2 liters".to_string()),
            completed: false,
            due_date: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut req = valid_request();
        req.title = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_overlong_title_rejected() {
        let mut req = valid_request();
        req.title = "x".repeat(101);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_max_length_title_accepted() {
        let mut req = valid_request();
        req.title = "x".repeat(100);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_description_rejected() {
        let mut req = valid_request();
        req.description = Some("x".repeat(501));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_past_due_date_rejected() {
        let mut req = valid_request();
        req.due_date = Some(Utc::now().date_naive() - Duration::days(1));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_today_due_date_accepted() {
        let mut req = valid_request();
        req.due_date = Some(Utc::now().date_naive());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_future_due_date_accepted() {
        let mut req = valid_request();
        req.due_date = Some(Utc::now().date_naive() + Duration::days(30));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_completed_defaults_to_false() {
        let req: TaskRequest =
            serde_json::from_str(r#"{ "title": "Buy milk" }"#).expect("Should deserialize");
        assert!(!req.completed);
    }

    #[test]
    fn test_owner_field_in_body_is_ignored() {
        // The body has no owner field; an extra "user_id" key is dropped
        let req: TaskRequest =
            serde_json::from_str(r#"{ "title": "Buy milk", "user_id": 999 }"#)
                .expect("Should deserialize");
        assert_eq!(req.title, "Buy milk");
    }
}
