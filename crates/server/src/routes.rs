use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use medialog_core::types::{Genre, MediaCategory};
use medialog_discovery::{DiscoveryError, DiscoveryRequest, DiscoveryResultSet};
use medialog_metadata::MetadataError;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/discover/{media_type}", get(discover))
        .route("/discover/{media_type}/genres", get(list_genres))
        .route("/discover/{media_type}/genres/refresh", post(refresh_genres))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Raw query string values; parsing is lenient and happens in `DiscoveryRequest`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverQuery {
    genre: Option<String>,
    sort_by: Option<String>,
    page: Option<String>,
    query: Option<String>,
}

async fn discover(
    State(state): State<AppState>,
    Path(media_type): Path<String>,
    Query(q): Query<DiscoverQuery>,
) -> Result<Json<DiscoveryResultSet>, AppError> {
    let req = DiscoveryRequest::parse(
        &media_type,
        q.genre,
        q.sort_by.as_deref(),
        q.page.as_deref(),
        q.query,
    )?;

    // Provider failures come back degraded; only a dead task reaches here.
    let service = state.discovery.clone();
    let set = tokio::spawn(async move { service.discover(&req).await })
        .await
        .map_err(|e| {
            error!(media_type = %media_type, error = %e, "discovery task failed");
            DiscoveryError::Task(e.to_string())
        })?;

    Ok(Json(set))
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenresResponse {
    genres: Vec<Genre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GenresResponse {
    fn from_result(category: MediaCategory, result: Result<Vec<Genre>, MetadataError>) -> Self {
        match result {
            Ok(genres) => Self {
                genres,
                error: None,
            },
            Err(e) => {
                warn!(category = %category, error = %e, "genre list unavailable");
                Self {
                    genres: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn parse_category(media_type: &str) -> Result<MediaCategory, AppError> {
    MediaCategory::from_route(media_type)
        .ok_or_else(|| DiscoveryError::InvalidCategory(media_type.to_string()).into())
}

async fn list_genres(
    State(state): State<AppState>,
    Path(media_type): Path<String>,
) -> Result<Json<GenresResponse>, AppError> {
    let category = parse_category(&media_type)?;
    let result = state.discovery.genres(category).await;
    Ok(Json(GenresResponse::from_result(category, result)))
}

async fn refresh_genres(
    State(state): State<AppState>,
    Path(media_type): Path<String>,
) -> Result<Json<GenresResponse>, AppError> {
    let category = parse_category(&media_type)?;
    let result = state.discovery.refresh_genres(category).await;
    Ok(Json(GenresResponse::from_result(category, result)))
}
