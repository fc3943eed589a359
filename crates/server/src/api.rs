//! HTTP API over the recommendation service.
//!
//! - `POST /api/recommendations` with `{ "movie_name": "..." }`
//! - `GET /api/health`

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::Method,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppResult;
use crate::service::{DEFAULT_TOP_K, Recommendation, RecommendationService};

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub top_k: usize,
}

impl AppState {
    pub fn new(service: RecommendationService) -> Self {
        Self {
            service: Arc::new(service),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub movie_name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MovieResponse {
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub vote_average: f32,
    pub release_date: String,
}

impl From<Recommendation> for MovieResponse {
    fn from(rec: Recommendation) -> Self {
        Self {
            title: rec.title,
            overview: rec.overview,
            poster_path: rec.poster_path,
            vote_average: rec.vote_average,
            release_date: rec.release_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub movies_count: usize,
}

// Handlers

pub async fn get_recommendations(
    State(state): State<AppState>,
    Json(request): Json<MovieRequest>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let recommendations = state.service.recommend(&request.movie_name, state.top_k)?;
    info!(
        "Recommended {} movies for '{}'",
        recommendations.len(),
        request.movie_name
    );
    Ok(Json(recommendations.into_iter().map(MovieResponse::from).collect()))
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        movies_count: state.service.movies_count(),
    })
}

/// Permissive CORS for local development
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Creates the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommendations", post(get_recommendations))
        .route("/api/health", get(health_check))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
