//! Web API module for FingerMath.
//!
//! This module serves the camera pages and a small REST API. The browser
//! runs the camera and the hand landmark model, then posts each frame's
//! landmarks; the server counts fingers, scores answers and tells the page
//! what to show.
//!
//! # Endpoints
//!
//! - `GET /` - Landing page
//! - `GET /camera` - Camera exercise page
//! - `GET /health` - Health check
//! - `GET /api/info` - Detector options and session rules
//! - `POST /api/sessions` - Start a session
//! - `GET /api/sessions/{id}` - Current session state
//! - `POST /api/sessions/{id}/detections` - Submit one frame's detection
//! - `DELETE /api/sessions/{id}` - End a session

pub mod sessions;
pub mod static_files;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::constants::APP_NAME;
use crate::models::{DetectionRecord, Operator, MAX_ANSWER, MIN_ANSWER};
use crate::recognition::finger_counter::{MAX_TALLY, TALLY_BASE};
use crate::session::{CaptureSize, DetectorOptions};

pub use sessions::{
    DetectionOutcome, ProblemView, RegistryError, SessionRegistry, SessionSnapshot, MAX_SESSIONS,
};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// Live sessions
    sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let sessions = SessionRegistry::new(&config);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// Creates a state with a custom session limit.
    #[must_use]
    pub fn with_session_limit(config: Config, limit: usize) -> Self {
        let sessions = SessionRegistry::with_limit(&config, limit);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// Returns the application configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current health status (e.g., "healthy").
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range<T> {
    /// Lower bound
    pub min: T,
    /// Upper bound
    pub max: T,
}

/// Static information a client needs before starting a session.
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Application name.
    pub name: String,
    /// Options the client must pass to its hand landmark model.
    pub detector: DetectorOptions,
    /// Offscreen canvas size.
    pub capture: CaptureSize,
    /// Feedback window in milliseconds.
    pub lock_duration_ms: u64,
    /// Wrong answers before a problem is replaced.
    pub failure_threshold: u32,
    /// Operators problems may use.
    pub operators: Vec<Operator>,
    /// Range of problem answers.
    pub answer_range: Range<u8>,
    /// Range of the raw finger tally.
    pub count_range: Range<i8>,
    /// Largest answer a single hand can show.
    pub max_reachable_count: i8,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validates a session id from the URL.
///
/// Ids are generated as UUIDs, so anything else can be rejected before the
/// registry is consulted.
fn validate_session_id(id: &str) -> Result<&str, ApiError> {
    if id.is_empty() {
        return Err(ApiError::new("Session id cannot be empty"));
    }
    Uuid::parse_str(id)
        .map_err(|e| ApiError::with_details("Invalid session id", e.to_string()))?;
    Ok(id)
}

fn session_not_found(id: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(format!("Session not found: {id}"))),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/info - Detector options and session rules.
async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let config = state.config();
    Json(InfoResponse {
        name: APP_NAME.to_string(),
        detector: config.detector,
        capture: config.capture,
        lock_duration_ms: config.session.lock_duration_ms,
        failure_threshold: config.session.failure_threshold,
        operators: Operator::ALL.to_vec(),
        answer_range: Range {
            min: MIN_ANSWER,
            max: MAX_ANSWER,
        },
        count_range: Range {
            min: TALLY_BASE,
            max: MAX_TALLY,
        },
        max_reachable_count: MAX_TALLY,
    })
}

/// POST /api/sessions - Start a session.
async fn create_session(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<SessionSnapshot>)> {
    match state.sessions().create(Instant::now()) {
        Ok(snapshot) => Ok((StatusCode::CREATED, Json(snapshot))),
        Err(e @ RegistryError::Full(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::with_details(
                "Too many active sessions",
                e.to_string(),
            )),
        )),
    }
}

/// GET /api/sessions/{id} - Current session state.
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let id = validate_session_id(&id).map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;
    state
        .sessions()
        .get(id, Instant::now())
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

/// POST /api/sessions/{id}/detections - Submit one frame's detection.
async fn submit_detection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<DetectionRecord>,
) -> ApiResult<Json<DetectionOutcome>> {
    let id = validate_session_id(&id).map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;
    let event = record.into_event().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::with_details("Invalid detection", e.to_string())),
        )
    })?;

    state
        .sessions()
        .submit(id, &event, Instant::now())
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

/// DELETE /api/sessions/{id} - End a session.
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = validate_session_id(&id).map_err(|e| (StatusCode::BAD_REQUEST, Json(e)))?;
    if state.sessions().remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

/// GET / - Landing page.
async fn landing_page() -> Response {
    static_files::serve_file("index.html")
}

/// GET /camera - Camera exercise page.
async fn camera_page() -> Response {
    static_files::serve_file("camera.html")
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the router with pages, API endpoints and static assets.
pub fn create_router(state: AppState) -> Router {
    // Pages and API are served from the same origin; the permissive policy
    // only matters for pages opened from elsewhere on the local machine.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(landing_page))
        .route("/camera", get(camera_page))
        // Health check
        .route("/health", get(health_check))
        // API
        .route("/api/info", get(get_info))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/detections", post(submit_detection))
        // Scripts and styles
        .fallback(static_files::serve_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Drops idle sessions in the background for the lifetime of the server.
fn spawn_idle_sweeper(sessions: Arc<SessionRegistry>) {
    let period = sessions.idle_timeout();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let dropped = sessions.evict_idle(Instant::now());
            if dropped > 0 {
                info!(dropped, active = sessions.len(), "Swept idle sessions");
            }
        }
    });
}

/// Runs the web server.
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: Config, addr: SocketAddr) -> anyhow::Result<()> {
    let state = AppState::new(config);
    spawn_idle_sweeper(Arc::clone(&state.sessions));
    let app = create_router(state);

    info!("Starting {} web server on http://{}", APP_NAME, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
