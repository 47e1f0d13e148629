use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::board::models::{Opportunity, UpdateStageRequest};
use crate::errors::PersistenceError;
use crate::gateway::{InMemoryGateway, StageGateway};
use crate::session::SessionTokens;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub store: Arc<InMemoryGateway>,
    /// Issued token pair. `None` serves every request without auth.
    pub auth: Mutex<Option<SessionTokens>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: Arc<InMemoryGateway>) -> Self {
        Self {
            store,
            auth: Mutex::new(None),
        }
    }

    pub fn with_auth(store: Arc<InMemoryGateway>, tokens: SessionTokens) -> Self {
        Self {
            store,
            auth: Mutex::new(Some(tokens)),
        }
    }

    fn current_auth(&self) -> Option<SessionTokens> {
        self.auth
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/v1/opportunities", get(list_opportunities))
        .route(
            "/api/v1/opportunities/{id}",
            get(get_opportunity).put(update_opportunity_stage),
        )
        .route("/api/v1/auth/refresh", post(refresh_session))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Check the access token when the server was started with auth.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(tokens) = state.current_auth() else {
        return Ok(());
    };
    match (bearer(headers), tokens.token.as_deref()) {
        (Some(given), Some(expected)) if given == expected => Ok(()),
        _ => Err(ApiError::Unauthorized("invalid or expired token".into())),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_opportunities(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Opportunity>>, ApiError> {
    authorize(&state, &headers)?;
    let opportunities = state.store.fetch_opportunities().await?;
    Ok(Json(opportunities))
}

async fn get_opportunity(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Opportunity>, ApiError> {
    authorize(&state, &headers)?;
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or_else(|| PersistenceError::NotFound { id }.into())
}

async fn update_opportunity_stage(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateStageRequest>,
) -> Result<Json<Opportunity>, ApiError> {
    authorize(&state, &headers)?;
    let updated = state.store.update_stage(&id, req.pipeline_stage).await?;
    tracing::info!(opportunity_id = %id, stage = %updated.pipeline_stage, "stage updated");
    Ok(Json(updated))
}

/// Rotate the token pair. The caller presents the refresh token as bearer.
async fn refresh_session(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let mut auth = state.auth.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(current) = auth.as_ref() else {
        return Err(ApiError::NotFound("authentication is disabled".into()));
    };
    match (bearer(&headers), current.refresh_token.as_deref()) {
        (Some(given), Some(expected)) if given == expected => {}
        _ => return Err(ApiError::Unauthorized("invalid refresh token".into())),
    }
    let pair = RefreshResponse {
        token: uuid::Uuid::new_v4().to_string(),
        refresh_token: uuid::Uuid::new_v4().to_string(),
    };
    *auth = Some(SessionTokens {
        token: Some(pair.token.clone()),
        refresh_token: Some(pair.refresh_token.clone()),
    });
    tracing::debug!("session tokens rotated");
    Ok(Json(pair))
}
