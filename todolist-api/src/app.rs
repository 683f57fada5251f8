/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/
///     ├── /auth/                     # Authentication (public)
///     │   ├── POST /signup
///     │   ├── POST /signin
///     │   └── POST /refresh
///     ├── /tasks/                    # Task management (authenticated)
///     │   ├── GET    /               # List own tasks (?completed= filter)
///     │   ├── POST   /               # Create task
///     │   ├── GET    /overdue        # List overdue tasks
///     │   ├── GET    /:id            # Get task
///     │   ├── PUT    /:id            # Update task
///     │   ├── DELETE /:id            # Delete task
///     │   ├── PATCH  /:id/complete   # Toggle completion
///     │   └── GET    /user/:user_id  # List a user's tasks (self or admin)
///     └── /users/                    # User management (authenticated)
///         ├── GET    /               # List users (admin)
///         ├── GET    /:id            # Get user (self or admin)
///         ├── PUT    /:id            # Update user (self or admin)
///         ├── DELETE /:id            # Delete user (admin)
///         └── PATCH  /:id/role       # Change role (admin)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. JWT authentication (task and user routes only)

use crate::config::Config;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use todolist_shared::{
    auth::{
        jwt,
        middleware::{extract_bearer_token, AuthContext},
    },
    models::user::User,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin))
        .route("/refresh", post(routes::auth::refresh));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/overdue", get(routes::tasks::list_overdue_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/complete", patch(routes::tasks::toggle_task_completed))
        .route("/user/:user_id", get(routes::tasks::list_tasks_by_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // User routes (require JWT authentication; role checks happen in handlers)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .route("/:id/role", patch(routes::users::update_user_role))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token, loads the user from the
/// database, and injects an [`AuthContext`] into request extensions. Loading
/// the user on every request means a role change or account deletion takes
/// effect immediately, without waiting for token expiry.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = extract_bearer_token(auth_header)?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // The token may outlive the account
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| crate::error::ApiError::Unauthorized("User no longer exists".to_string()))?;

    let auth_context = AuthContext {
        user_id: user.id,
        role: user.role,
    };

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
