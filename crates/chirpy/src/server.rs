//! HTTP routes.
//!
//! Handlers translate requests into [`Store`] calls and store results into
//! responses. The store blocks on file I/O and argon2 is CPU-bound, so both
//! run on tokio's blocking pool. A blocking task runs to completion even if
//! the client disconnects and the handler future is dropped.

use crate::censor::Censor;
use crate::config::ChirpConfig;
use crate::credentials::{hash_password, verify_password};
use crate::error::ApiError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chirpy_db::{Post, Store, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
///
/// The store is constructed once at start-up and handed in here; handlers
/// never reach it any other way.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    censor: Arc<Censor>,
    max_chirp_length: usize,
    hits: Arc<AtomicU64>,
}

impl AppState {
    /// Create handler state around an open store.
    pub fn new(store: Arc<Store>, chirps: &ChirpConfig) -> Self {
        Self {
            store,
            censor: Arc::new(Censor::new(&chirps.profane_words)),
            max_chirp_length: chirps.max_length,
            hits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of `/api` requests served since start-up or the last reset.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/chirps", get(list_chirps).post(create_chirp))
        .route("/chirps/:chirp_id", get(get_chirp))
        .route("/users", post(create_user))
        .route("/login", post(login))
        .route_layer(middleware::from_fn_with_state(state.clone(), count_hits));

    let admin = Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset_metrics));

    Router::new()
        .nest("/api", api)
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Run `f` on the blocking pool and flatten the join error.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!(error = %e, "Blocking task failed");
        ApiError::Internal
    })?
}

// ==================
// Request/Response Types
// ==================

/// Body of `POST /api/chirps`
#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    /// Chirp text
    pub body: String,
}

/// Body of `POST /api/users` and `POST /api/login`
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    /// Account email
    pub email: String,
    /// Plaintext password, hashed before it reaches the store
    pub password: String,
}

/// A user as exposed over HTTP. The credential never leaves the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    /// User id
    pub id: u64,
    /// User email
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

// ==================
// Handlers
// ==================

async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

async fn create_chirp(
    State(state): State<AppState>,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let Json(request) = payload?;
    if request.body.len() > state.max_chirp_length {
        return Err(ApiError::ChirpTooLong);
    }

    let body = state.censor.apply(&request.body);
    let store = Arc::clone(&state.store);
    let post = blocking(move || Ok(store.create_post(body)?)).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_chirps(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let store = Arc::clone(&state.store);
    let mut posts = blocking(move || Ok(store.list_posts()?)).await?;
    posts.sort_by_key(|post| post.id);

    Ok(Json(posts))
}

async fn get_chirp(
    State(state): State<AppState>,
    chirp_id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(id) = chirp_id?;
    let store = Arc::clone(&state.store);
    let post = blocking(move || Ok(store.get_post(id)?)).await?;

    Ok(Json(post))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;
    let store = Arc::clone(&state.store);

    let user = blocking(move || {
        let digest = hash_password(&request.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::Internal
        })?;
        Ok(store.create_user(request.email, digest)?)
    })
    .await?;

    info!(id = user.id, "Registered user");
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    let store = Arc::clone(&state.store);

    let user = blocking(move || {
        let user = store
            .get_user_by_email(&request.email)
            .map_err(|e| match e {
                chirpy_db::Error::NotFound { .. } => ApiError::Unauthorized,
                other => other.into(),
            })?;
        if verify_password(&request.password, &user.credential) {
            Ok(user)
        } else {
            Err(ApiError::Unauthorized)
        }
    })
    .await?;

    Ok(Json(user.into()))
}

async fn count_hits(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::Relaxed);
    next.run(request).await
}

async fn metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has served {} API requests!</p>\n  </body>\n</html>\n",
        state.hits()
    ))
}

async fn reset_metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.hits.store(0, Ordering::Relaxed);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}
