/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (migrations run on connect)
/// - Test user creation with unique names
/// - JWT token generation
/// - Request/response helpers driving the router with `tower::oneshot`

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use todolist_api::app::{build_router, AppState};
use todolist_api::config::Config;
use todolist_shared::auth::jwt::{create_token, TokenType};
use todolist_shared::auth::password::hash_password;
use todolist_shared::db::migrations::run_migrations;
use todolist_shared::models::role::Role;
use todolist_shared::models::user::{CreateUser, User};
use tower::ServiceExt;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Produces a name unique across test runs and within a run
pub fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, nanos, n)
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Connects to the test database, runs migrations and builds the router
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Creates a user directly in the database and returns it with a valid
    /// access token
    pub async fn create_user(&self, role: Role) -> anyhow::Result<(User, String)> {
        let username = unique_name("user");
        let user = User::create(
            &self.db,
            CreateUser {
                username: username.clone(),
                email: format!("{}@example.com", username),
                password_hash: hash_password("test-password")?,
                role,
            },
        )
        .await?;

        let token = create_token(user.id, TokenType::Access, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Sends a request through the router and returns the response
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Removes a test user (owned tasks cascade)
    pub async fn cleanup_user(&self, user_id: i64) -> anyhow::Result<()> {
        User::delete(&self.db, user_id).await?;
        Ok(())
    }
}

/// Reads a response body as JSON, panicking with the raw body on failure
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("Response was not JSON: {}", String::from_utf8_lossy(&body)))
}

/// Asserts a status, printing the body when it differs
pub async fn assert_status(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8_lossy(&body).to_string();

    assert_eq!(status, expected, "Unexpected status, body: {}", body_str);

    if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| panic!("Response was not JSON: {}", body_str))
    }
}
