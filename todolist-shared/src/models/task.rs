/// Task model and database operations
///
/// Tasks are the unit of work users manage. Every task has exactly one owner,
/// fixed at creation; a non-admin caller can only see or touch tasks they own.
///
/// All queries join the owner's username in, since responses always carry it,
/// and every write is a single atomic statement (`INSERT`/`UPDATE` in a CTE
/// with `RETURNING`), so concurrent writes to the same row cannot interleave
/// partially: the database is the sole arbiter of conflicting writes.
///
/// # Ownership scoping
///
/// Single-task operations take an `owner` filter: `Some(user_id)` restricts
/// the lookup to tasks owned by that user, `None` (admin) matches by ID
/// alone. A task that exists but is filtered out is indistinguishable from
/// one that does not exist: callers see plain absence, never a hint that the
/// ID is taken.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date DATE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.completed, t.due_date, \
     t.created_at, t.updated_at, t.user_id, u.username";

/// Task row joined with its owner's username
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique numeric task ID
    pub id: i64,

    /// Short title, non-blank, at most 100 characters
    pub title: String,

    /// Optional description, at most 500 characters
    pub description: Option<String>,

    /// Completion flag, false on creation unless explicitly provided
    pub completed: bool,

    /// Optional due date; never in the past at the moment it is written
    pub due_date: Option<NaiveDate>,

    /// When the task was created (server-assigned, set once)
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,

    /// Owning user's ID, immutable after creation
    pub user_id: i64,

    /// Owning user's username
    pub username: String,
}

/// Field values written by create and update
///
/// The owner is deliberately not part of this struct: on create it is forced
/// to the caller, and update never changes it.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Creates a new task owned by `owner_id`
    pub async fn create(
        pool: &PgPool,
        owner_id: i64,
        data: TaskFields,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            WITH t AS (
                INSERT INTO tasks (title, description, completed, due_date, user_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {TASK_COLUMNS}
            FROM t JOIN users u ON u.id = t.user_id
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.due_date)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID within the given ownership scope
    pub async fn find(
        pool: &PgPool,
        id: i64,
        owner: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t JOIN users u ON u.id = t.user_id
            WHERE t.id = $1 AND ($2::BIGINT IS NULL OR t.user_id = $2)
            "#,
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks, newest first
    ///
    /// `owner` restricts to one user's tasks (`None` lists every user's);
    /// `completed` filters on the completion flag when present.
    pub async fn list(
        pool: &PgPool,
        owner: Option<i64>,
        completed: Option<bool>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t JOIN users u ON u.id = t.user_id
            WHERE ($1::BIGINT IS NULL OR t.user_id = $1)
              AND ($2::BOOLEAN IS NULL OR t.completed = $2)
            ORDER BY t.created_at DESC
            "#,
        ))
        .bind(owner)
        .bind(completed)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists a user's incomplete tasks whose due date has passed
    pub async fn list_overdue(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t JOIN users u ON u.id = t.user_id
            WHERE t.user_id = $1 AND t.due_date < CURRENT_DATE AND t.completed = FALSE
            ORDER BY t.due_date
            "#,
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Overwrites a task's fields within the given ownership scope
    ///
    /// Title, description, completed and due date are replaced wholesale and
    /// `updated_at` is refreshed. The owner never changes.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no task matched the scope.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        owner: Option<i64>,
        data: TaskFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            WITH t AS (
                UPDATE tasks
                SET title = $3,
                    description = $4,
                    completed = $5,
                    due_date = $6,
                    updated_at = NOW()
                WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)
                RETURNING *
            )
            SELECT {TASK_COLUMNS}
            FROM t JOIN users u ON u.id = t.user_id
            "#,
        ))
        .bind(id)
        .bind(owner)
        .bind(data.title)
        .bind(data.description)
        .bind(data.completed)
        .bind(data.due_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Flips the completion flag within the given ownership scope
    ///
    /// The flip happens in SQL (`completed = NOT completed`), so two
    /// concurrent toggles each invert the value exactly once.
    ///
    /// # Returns
    ///
    /// The updated task, or `None` if no task matched the scope.
    pub async fn toggle_completed(
        pool: &PgPool,
        id: i64,
        owner: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            WITH t AS (
                UPDATE tasks
                SET completed = NOT completed, updated_at = NOW()
                WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)
                RETURNING *
            )
            SELECT {TASK_COLUMNS}
            FROM t JOIN users u ON u.id = t.user_id
            "#,
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task within the given ownership scope
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if none matched (repeating a delete
    /// reports absence).
    pub async fn delete(pool: &PgPool, id: i64, owner: Option<i64>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fields_struct() {
        let fields = TaskFields {
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            due_date: None,
        };

        assert_eq!(fields.title, "Buy milk");
        assert!(!fields.completed);
    }

    #[test]
    fn test_task_serializes_owner_and_username() {
        let task = Task {
            id: 1,
            title: "Buy milk".to_string(),
            description: Some("2 liters".to_string()),
            completed: false,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            user_id: 5,
            username: "alice".to_string(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["user_id"], 5);
        assert_eq!(json["username"], "alice");
    }

    // Database-backed tests live in the API crate's integration suite.
}
